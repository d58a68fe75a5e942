//! Shared types for the unimove workspace.
//!
//! This crate holds the chain-independent vocabulary every other crate speaks:
//!
//! - [`chain`]: the closed [`ChainId`] set and the [`ConfigurationError`] raised
//!   when an unrecognized chain name crosses a boundary
//! - [`address`]: 32-byte Move address normalization
//! - [`struct_tag`]: `0x2::coin::Coin<0x2::sui::SUI>`-style type parsing
//! - [`scheme`]: signature scheme flags and [`ParsedKeypair`]
//! - [`encoding`]: hex/base64 helpers

pub mod address;
pub mod chain;
pub mod encoding;
pub mod scheme;
pub mod struct_tag;

pub use chain::{ChainId, ConfigurationError};
pub use scheme::{ParsedKeypair, SignatureScheme};
pub use struct_tag::{
    normalize_struct_tag, parse_struct_tag, parse_type_tag, StructTag, StructTagError, TypeTag,
};

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of retry attempts after the first failure.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl RetryConfig {
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// No retries; the first failure is returned.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Backoff before retry number `attempt` (0-based), doubling up to the cap.
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16) as u32).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(5000),
        }
    }
}
