//! Custom assertion utilities for tests.

use serde_json::Value;
use unimove::OperationState;

/// Assert that a result is Ok and return the inner value.
///
/// # Panics
///
/// Panics with `context` and the error if the result is `Err`.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that a result is Err and return the error.
#[allow(dead_code)]
pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>, context: &str) -> E {
    match result {
        Ok(v) => panic!("{} should have failed but got: {:?}", context, v),
        Err(e) => e,
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that a dispatched operation failed with a message containing
/// `expected_text`.
#[allow(dead_code)]
pub fn assert_state_error(state: &OperationState, expected_text: &str) {
    assert!(
        state.is_error(),
        "{} on {} should have failed, got data: {:?}",
        state.operation,
        state.chain,
        state.data
    );
    if let Some(error) = &state.error {
        assert_error_contains(error, expected_text, &state.operation);
    }
}

/// Assert that two JSON objects have the same keys, recursively, ignoring
/// the values.
#[allow(dead_code)]
pub fn assert_same_shape(left: &Value, right: &Value, context: &str) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let lk: Vec<_> = l.keys().collect();
            let rk: Vec<_> = r.keys().collect();
            assert_eq!(lk, rk, "{}: key sets differ", context);
            for key in l.keys() {
                assert_same_shape(&l[key], &r[key], &format!("{}.{}", context, key));
            }
        }
        (l, r) => assert_eq!(
            std::mem::discriminant(l),
            std::mem::discriminant(r),
            "{}: value kinds differ ({} vs {})",
            context,
            l,
            r
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_ok() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok(result, "test operation"), 42);
    }

    #[test]
    #[should_panic(expected = "test operation failed")]
    fn test_assert_ok_fails() {
        let result: Result<i32, &str> = Err("error");
        assert_ok(result, "test operation");
    }

    #[test]
    fn test_assert_same_shape_ignores_values() {
        assert_same_shape(&json!({"a": 1, "b": {"c": "x"}}), &json!({"a": 2, "b": {"c": "y"}}), "shape");
    }

    #[test]
    #[should_panic(expected = "key sets differ")]
    fn test_assert_same_shape_detects_missing_key() {
        assert_same_shape(&json!({"a": 1}), &json!({"b": 1}), "shape");
    }
}
