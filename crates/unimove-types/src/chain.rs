//! Chain discriminator.
//!
//! [`ChainId`] is the closed set of Move ecosystems the workspace can target.
//! Registry boundaries parse with [`ChainId::from_str`], which accepts only
//! the exact lowercase identifiers. Operator input (environment, CLI flags)
//! goes through [`ChainId::parse_lenient`] instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Sui,
    Iota,
}

impl ChainId {
    /// Every recognized chain, in registry order.
    pub const ALL: [ChainId; 2] = [ChainId::Sui, ChainId::Iota];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ChainId::Sui => "sui",
            ChainId::Iota => "iota",
        }
    }

    /// Position in [`ChainId::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            ChainId::Sui => 0,
            ChainId::Iota => 1,
        }
    }

    /// Returns the chain named by `value` if it is a recognized identifier.
    ///
    /// Exact match: `"SUI"` and `" sui "` are not chains.
    pub fn parse_exact(value: &str) -> Option<ChainId> {
        ChainId::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Trims and ignores ASCII case. Only for operator-typed values.
    pub fn parse_lenient(value: &str) -> Result<ChainId, ConfigurationError> {
        let trimmed = value.trim();
        ChainId::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigurationError::unknown_chain(value))
    }

    /// Human-facing name used in diagnostics.
    pub const fn display_name(&self) -> &'static str {
        match self {
            ChainId::Sui => "Sui",
            ChainId::Iota => "IOTA",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainId::parse_exact(s).ok_or_else(|| ConfigurationError::unknown_chain(s))
    }
}

/// An unrecognized chain identifier reached a registry boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    /// The rejected identifier, verbatim.
    pub chain: String,
}

impl ConfigurationError {
    pub fn unknown_chain(chain: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = ChainId::ALL.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "Unsupported chain: '{}' (expected one of: {})",
            self.chain,
            known.join(", ")
        )
    }
}

impl std::error::Error for ConfigurationError {}
