#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `assertions`: assertion helpers with readable failure messages
//! - `keys`: deterministic key material per chain
//! - `network`: gating for tests that reach public endpoints

pub mod assertions;
pub mod keys;
pub mod network;

pub use assertions::{
    assert_err, assert_error_contains, assert_ok, assert_same_shape, assert_state_error,
};
pub use keys::{fixed_keypair, fixed_secret_key};
pub use network::should_run_network_tests;
