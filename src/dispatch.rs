//! Generic operation dispatch.
//!
//! Chain resolution, in priority order:
//!
//! 1. an explicit chain passed by the caller;
//! 2. a trailing string argument that names a chain exactly (`"sui"`,
//!    `"iota"`), which is removed from the forwarded arguments;
//! 3. the ambient chain ([`crate::context`]), then the dispatcher's default.
//!
//! Resolution and the operation call happen synchronously inside
//! [`Dispatcher::dispatch`]. The returned future is already bound to the
//! chain that was current at call time, so switching the ambient chain
//! before awaiting it has no effect on the result.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, trace};
use unimove_types::ChainId;

use crate::config::config;
use crate::context::scoped_chain;
use crate::error::{
    DispatchError, UnimoveError, UnimoveResult, UnresolvedChainError, UnsupportedOperationError,
};
use crate::registry::{registry, ChainRegistry};

pub type OperationFuture = BoxFuture<'static, UnimoveResult<Value>>;

/// A registered operation: JSON arguments in, JSON result out.
pub type Operation = fn(Vec<Value>) -> OperationFuture;

/// A dispatched operation that has not completed yet.
pub type PendingOperation = BoxFuture<'static, OperationState>;

/// Outcome of a dispatched operation, in query/mutation style. Failures of
/// the operation itself land in `error`; `dispatch` only fails when no
/// operation could be started.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState {
    pub chain: ChainId,
    pub operation: String,
    pub data: Option<Value>,
    pub error: Option<UnimoveError>,
}

impl OperationState {
    fn from_result(chain: ChainId, operation: String, result: UnimoveResult<Value>) -> Self {
        let (data, error) = match result {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            chain,
            operation,
            data,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> UnimoveResult<Value> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data.unwrap_or(Value::Null)),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "chain": self.chain,
            "operation": self.operation,
            "data": self.data,
            "error": self.error.as_ref().map(|e| e.to_string()),
            "isSuccess": self.is_success(),
            "isError": self.is_error(),
        })
    }
}

/// Resolves chains and invokes registry operations.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    registry: &'static ChainRegistry,
    default_chain: Option<ChainId>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Uses the process registry and the configured default chain.
    pub fn new() -> Self {
        Self {
            registry: registry(),
            default_chain: config().default_chain,
        }
    }

    /// Replace the fallback used when no scope is active. `None` makes
    /// unscoped dispatch without a chain fail.
    pub fn with_default_chain(mut self, chain: Option<ChainId>) -> Self {
        self.default_chain = chain;
        self
    }

    pub fn default_chain(&self) -> Option<ChainId> {
        self.default_chain
    }

    /// Pick the effective chain, stripping a trailing chain argument when it
    /// is what decided.
    pub fn resolve_chain(
        &self,
        operation: &str,
        explicit: Option<ChainId>,
        args: &mut Vec<Value>,
    ) -> Result<ChainId, UnresolvedChainError> {
        if let Some(chain) = explicit {
            return Ok(chain);
        }
        if let Some(chain) = args.last().and_then(Value::as_str).and_then(ChainId::parse_exact) {
            args.pop();
            trace!(operation, %chain, "chain taken from trailing argument");
            return Ok(chain);
        }
        scoped_chain()
            .or(self.default_chain)
            .ok_or_else(|| UnresolvedChainError {
                operation: operation.to_string(),
            })
    }

    pub fn dispatch(
        &self,
        operation: &str,
        explicit: Option<ChainId>,
        mut args: Vec<Value>,
    ) -> Result<PendingOperation, DispatchError> {
        let chain = self.resolve_chain(operation, explicit, &mut args)?;
        let op = self
            .registry
            .operation(chain, operation)
            .ok_or_else(|| UnsupportedOperationError {
                chain,
                operation: operation.to_string(),
            })?;
        debug!(operation, %chain, args = args.len(), "dispatch");
        let name = operation.to_string();
        let pending = op(args);
        Ok(pending
            .map(move |result| OperationState::from_result(chain, name, result))
            .boxed())
    }

    /// Dispatch on a chain named by a string, validated first.
    pub fn dispatch_on(
        &self,
        chain: &str,
        operation: &str,
        args: Vec<Value>,
    ) -> Result<PendingOperation, DispatchError> {
        let chain: ChainId = chain.parse()?;
        self.dispatch(operation, Some(chain), args)
    }

    /// Operation names available on `chain`.
    pub fn operations(&self, chain: ChainId) -> Vec<&'static str> {
        self.registry.bundle(chain).operation_names().collect()
    }
}

/// Dispatch with the process defaults.
pub fn dispatch(operation: &str, args: Vec<Value>) -> Result<PendingOperation, DispatchError> {
    Dispatcher::new().dispatch(operation, None, args)
}

/// A named wrapper around one operation.
///
/// ```ignore
/// let parse = OperationCaller::new("parse_struct_tag");
/// let state = parse.call(vec![json!("0x2::coin::Coin<0x2::sui::SUI>")])?.await;
/// ```
#[derive(Debug, Clone)]
pub struct OperationCaller {
    name: &'static str,
    dispatcher: Dispatcher,
}

impl OperationCaller {
    pub fn new(name: &'static str) -> Self {
        Self::with_dispatcher(name, Dispatcher::new())
    }

    pub fn with_dispatcher(name: &'static str, dispatcher: Dispatcher) -> Self {
        Self { name, dispatcher }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: Vec<Value>) -> Result<PendingOperation, DispatchError> {
        self.dispatcher.dispatch(self.name, None, args)
    }

    pub fn call_on(
        &self,
        chain: ChainId,
        args: Vec<Value>,
    ) -> Result<PendingOperation, DispatchError> {
        self.dispatcher.dispatch(self.name, Some(chain), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::enter_chain;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new().with_default_chain(Some(ChainId::Sui))
    }

    #[test]
    fn test_explicit_beats_trailing_and_ambient() {
        let _ambient = enter_chain(ChainId::Sui);
        let mut args = vec![json!("x"), json!("iota")];
        let chain = dispatcher()
            .resolve_chain("op", Some(ChainId::Sui), &mut args)
            .unwrap();
        assert_eq!(chain, ChainId::Sui);
        // an explicit chain leaves the argument list alone
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_trailing_beats_ambient_and_is_stripped() {
        let _ambient = enter_chain(ChainId::Sui);
        let mut args = vec![json!("x"), json!("iota")];
        let chain = dispatcher().resolve_chain("op", None, &mut args).unwrap();
        assert_eq!(chain, ChainId::Iota);
        assert_eq!(args, vec![json!("x")]);
    }

    #[test]
    fn test_trailing_match_is_exact() {
        let _ambient = enter_chain(ChainId::Iota);
        let mut args = vec![json!("SUI")];
        let chain = dispatcher().resolve_chain("op", None, &mut args).unwrap();
        assert_eq!(chain, ChainId::Iota);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_unresolved_without_default() {
        let d = Dispatcher::new().with_default_chain(None);
        let err = d.resolve_chain("get_fullnode_url", None, &mut Vec::new()).unwrap_err();
        assert_eq!(err.operation, "get_fullnode_url");
    }

    #[test]
    fn test_unsupported_operation_is_synchronous() {
        let err = dispatcher()
            .dispatch("decode_jwt", Some(ChainId::Iota), vec![])
            .err()
            .unwrap();
        assert_eq!(
            err,
            DispatchError::UnsupportedOperation(UnsupportedOperationError {
                chain: ChainId::Iota,
                operation: "decode_jwt".into(),
            })
        );
    }

    #[test]
    fn test_dispatch_on_unknown_chain() {
        let err = dispatcher().dispatch_on("tron", "get_fullnode_url", vec![]).err().unwrap();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_operation_failure_lands_in_state() {
        let state = dispatcher()
            .dispatch("parse_struct_tag", Some(ChainId::Sui), vec![json!("not a tag")])
            .unwrap()
            .await;
        assert_eq!(state.chain, ChainId::Sui);
        assert!(state.is_error());
        assert!(state.data.is_none());
        assert_eq!(state.to_json()["isError"], true);
    }
}
