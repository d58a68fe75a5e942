//! Network-dependent test utilities.
//!
//! Tests that reach public fullnodes or faucets run only when the
//! `network-tests` feature is enabled or `RUN_NETWORK_TESTS` is set.

use std::env;

/// Environment variable to enable network tests.
pub const RUN_NETWORK_TESTS_VAR: &str = "RUN_NETWORK_TESTS";

/// Check if network tests should be run.
pub fn should_run_network_tests() -> bool {
    cfg!(feature = "network-tests")
        || env::var(RUN_NETWORK_TESTS_VAR)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
}

/// Macro to skip a test if network tests are not enabled.
///
/// Usage:
/// ```ignore
/// #[tokio::test]
/// async fn test_network_feature() {
///     skip_if_no_network!();
///     // ... network-dependent test code ...
/// }
/// ```
#[macro_export]
macro_rules! skip_if_no_network {
    () => {
        if !$crate::common::network::should_run_network_tests() {
            eprintln!(
                "Skipping {}: {} not set",
                module_path!(),
                $crate::common::network::RUN_NETWORK_TESTS_VAR
            );
            return;
        }
    };
}
