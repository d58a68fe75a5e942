//! Error taxonomy for the facade.
//!
//! | Error | Raised by | Channel |
//! |-------|-----------|---------|
//! | [`ConfigurationError`] | registry, loader, string chain ids | synchronous `Err` |
//! | [`UnresolvedChainError`] | dispatcher | synchronous `Err` |
//! | [`UnsupportedOperationError`] | dispatcher | synchronous `Err` |
//! | [`SdkLoadError`] | loader | resolved value of the shared load future |
//! | [`InvalidPrivateKeyError`] | `decode_private_key` | per-call `Err` |
//!
//! Failures inside a dispatched operation never surface as dispatch errors;
//! they land in [`crate::dispatch::OperationState::error`] as an
//! [`UnimoveError`].

use std::fmt;

use unimove_crypto::CryptoError;
use unimove_transport::{FaucetError, TransportError, UnknownNetwork};
use unimove_types::{ChainId, StructTagError};

use crate::chains::transaction::TransactionError;

pub use unimove_types::ConfigurationError;

/// No explicit chain, no trailing chain argument, and no ambient chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedChainError {
    pub operation: String,
}

impl fmt::Display for UnresolvedChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot resolve chain for operation '{}': pass a chain explicitly, as the last argument, or set an ambient chain",
            self.operation
        )
    }
}

impl std::error::Error for UnresolvedChainError {}

/// The resolved chain has no entry for the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedOperationError {
    pub chain: ChainId,
    pub operation: String,
}

impl fmt::Display for UnsupportedOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation '{}' is not supported on chain '{}'",
            self.operation, self.chain
        )
    }
}

impl std::error::Error for UnsupportedOperationError {}

/// A chain's modules could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLoadError {
    pub chain: ChainId,
    pub reason: String,
    /// What must be enabled for the load to succeed.
    pub required: Vec<String>,
}

impl SdkLoadError {
    pub fn new(chain: ChainId, reason: impl Into<String>) -> Self {
        Self {
            chain,
            reason: reason.into(),
            required: vec![format!("unimove/{}", chain.as_str())],
        }
    }
}

impl fmt::Display for SdkLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to load {} SDK ({}). Make sure the following are enabled: {}",
            self.chain.display_name(),
            self.reason,
            self.required.join(", ")
        )
    }
}

impl std::error::Error for SdkLoadError {}

/// Decoding a private key failed; `message` is the underlying decoder's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPrivateKeyError {
    pub chain: ChainId,
    pub message: String,
}

impl fmt::Display for InvalidPrivateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid private key for {}: {}",
            self.chain.display_name(),
            self.message
        )
    }
}

impl std::error::Error for InvalidPrivateKeyError {}

/// Why a dispatch could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    Configuration(ConfigurationError),
    UnresolvedChain(UnresolvedChainError),
    UnsupportedOperation(UnsupportedOperationError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Configuration(e) => e.fmt(f),
            DispatchError::UnresolvedChain(e) => e.fmt(f),
            DispatchError::UnsupportedOperation(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Configuration(e) => Some(e),
            DispatchError::UnresolvedChain(e) => Some(e),
            DispatchError::UnsupportedOperation(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for DispatchError {
    fn from(e: ConfigurationError) -> Self {
        DispatchError::Configuration(e)
    }
}

impl From<UnresolvedChainError> for DispatchError {
    fn from(e: UnresolvedChainError) -> Self {
        DispatchError::UnresolvedChain(e)
    }
}

impl From<UnsupportedOperationError> for DispatchError {
    fn from(e: UnsupportedOperationError) -> Self {
        DispatchError::UnsupportedOperation(e)
    }
}

/// Any failure the facade can report.
#[derive(Debug, Clone, PartialEq)]
pub enum UnimoveError {
    Configuration(ConfigurationError),
    UnresolvedChain(UnresolvedChainError),
    UnsupportedOperation(UnsupportedOperationError),
    SdkLoad(SdkLoadError),
    InvalidPrivateKey(InvalidPrivateKeyError),
    StructTag(StructTagError),
    Crypto(CryptoError),
    Transport(TransportError),
    Faucet(FaucetError),
    Transaction(TransactionError),
    /// An operation received arguments it cannot use.
    InvalidArgument(String),
    /// Wallet session misuse (not connected, unknown account).
    Wallet(String),
    /// The chain has no such network or service.
    Unavailable(String),
}

impl UnimoveError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        UnimoveError::InvalidArgument(msg.into())
    }
}

impl fmt::Display for UnimoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnimoveError::Configuration(e) => e.fmt(f),
            UnimoveError::UnresolvedChain(e) => e.fmt(f),
            UnimoveError::UnsupportedOperation(e) => e.fmt(f),
            UnimoveError::SdkLoad(e) => e.fmt(f),
            UnimoveError::InvalidPrivateKey(e) => e.fmt(f),
            UnimoveError::StructTag(e) => e.fmt(f),
            UnimoveError::Crypto(e) => e.fmt(f),
            UnimoveError::Transport(e) => e.fmt(f),
            UnimoveError::Faucet(e) => e.fmt(f),
            UnimoveError::Transaction(e) => e.fmt(f),
            UnimoveError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            UnimoveError::Wallet(msg) => write!(f, "Wallet error: {}", msg),
            UnimoveError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
        }
    }
}

impl std::error::Error for UnimoveError {}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for UnimoveError {
                fn from(e: $source) -> Self {
                    UnimoveError::$variant(e)
                }
            }
        )*
    };
}

impl_from! {
    ConfigurationError => Configuration,
    UnresolvedChainError => UnresolvedChain,
    UnsupportedOperationError => UnsupportedOperation,
    SdkLoadError => SdkLoad,
    InvalidPrivateKeyError => InvalidPrivateKey,
    StructTagError => StructTag,
    CryptoError => Crypto,
    TransportError => Transport,
    FaucetError => Faucet,
    TransactionError => Transaction,
}

impl From<DispatchError> for UnimoveError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Configuration(e) => UnimoveError::Configuration(e),
            DispatchError::UnresolvedChain(e) => UnimoveError::UnresolvedChain(e),
            DispatchError::UnsupportedOperation(e) => UnimoveError::UnsupportedOperation(e),
        }
    }
}

impl From<UnknownNetwork> for UnimoveError {
    fn from(e: UnknownNetwork) -> Self {
        UnimoveError::InvalidArgument(e.to_string())
    }
}

pub type UnimoveResult<T> = Result<T, UnimoveError>;
