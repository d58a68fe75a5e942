//! Process configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `UNIMOVE_DEFAULT_CHAIN` | `sui` | ambient chain when no scope is active; `none` disables it |
//! | `UNIMOVE_RPC_TIMEOUT_SECS` | 30 | JSON-RPC request timeout |
//! | `UNIMOVE_RPC_CONNECT_TIMEOUT_SECS` | 10 | JSON-RPC connect timeout |
//! | `UNIMOVE_RPC_RETRIES` | 3 | retries on transient RPC failures |

use std::sync::LazyLock;

use tracing::warn;
use unimove_transport::TransportOptions;
use unimove_types::{ChainId, ConfigurationError};

pub const DEFAULT_CHAIN_ENV: &str = "UNIMOVE_DEFAULT_CHAIN";

/// Chain used when nothing else selects one.
pub const FALLBACK_CHAIN: ChainId = ChainId::Sui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnimoveConfig {
    pub default_chain: Option<ChainId>,
    pub transport: TransportOptions,
}

impl Default for UnimoveConfig {
    fn default() -> Self {
        Self {
            default_chain: Some(FALLBACK_CHAIN),
            transport: TransportOptions::default(),
        }
    }
}

/// Interpret a `UNIMOVE_DEFAULT_CHAIN` value.
pub fn parse_default_chain(value: Option<&str>) -> Result<Option<ChainId>, ConfigurationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(Some(FALLBACK_CHAIN)),
        Some(v) if v.eq_ignore_ascii_case("none") => Ok(None),
        Some(v) => ChainId::parse_lenient(v).map(Some),
    }
}

impl UnimoveConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let raw = std::env::var(DEFAULT_CHAIN_ENV).ok();
        Ok(Self {
            default_chain: parse_default_chain(raw.as_deref())?,
            transport: TransportOptions::from_env(),
        })
    }
}

static CONFIG: LazyLock<UnimoveConfig> = LazyLock::new(|| {
    UnimoveConfig::from_env().unwrap_or_else(|e| {
        warn!("{}: {}; falling back to '{}'", DEFAULT_CHAIN_ENV, e, FALLBACK_CHAIN);
        UnimoveConfig::default()
    })
});

/// Configuration read once per process.
pub fn config() -> &'static UnimoveConfig {
    &CONFIG
}
