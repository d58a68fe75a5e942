use std::fmt;

use unimove_types::SignatureScheme;

/// Errors from key handling, signing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key bytes or text that do not decode to a key of the expected scheme.
    InvalidKey(String),
    /// A signature that is malformed or does not verify.
    InvalidSignature(String),
    /// The scheme has no operation of the requested kind (e.g. generating a
    /// passkey, or a scheme flag with no secret key).
    UnsupportedScheme(SignatureScheme),
    /// A flag byte outside the known scheme set.
    UnknownFlag(u8),
    /// Malformed multisig configuration or signature set.
    MultiSig(String),
    /// A JWT that cannot be decoded.
    InvalidJwt(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            CryptoError::InvalidSignature(msg) => write!(f, "Invalid signature: {}", msg),
            CryptoError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported signature scheme for this operation: {}", scheme)
            }
            CryptoError::UnknownFlag(flag) => write!(f, "Unknown signature scheme flag: {:#04x}", flag),
            CryptoError::MultiSig(msg) => write!(f, "Multisig error: {}", msg),
            CryptoError::InvalidJwt(msg) => write!(f, "Invalid JWT: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

pub type CryptoResult<T> = Result<T, CryptoError>;
