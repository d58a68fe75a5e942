//! Passkey (WebAuthn) public keys.
//!
//! A passkey is a secp256r1 key held by an authenticator; only its public
//! half is visible here, under flag `0x06`.

use unimove_types::encoding::base64_decode;
use unimove_types::SignatureScheme;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::PublicKey;

/// Compressed secp256r1 point length.
pub const PASSKEY_PUBLIC_KEY_LENGTH: usize = 33;

pub fn parse_passkey_public_key(bytes: &[u8]) -> CryptoResult<PublicKey> {
    if bytes.len() != PASSKEY_PUBLIC_KEY_LENGTH {
        return Err(CryptoError::InvalidKey(format!(
            "passkey public key must be {} bytes, got {}",
            PASSKEY_PUBLIC_KEY_LENGTH,
            bytes.len()
        )));
    }
    PublicKey::from_raw(SignatureScheme::Passkey, bytes)
}

/// Accepts raw base64 or the flagged form.
pub fn passkey_public_key_from_base64(b64: &str) -> CryptoResult<PublicKey> {
    let bytes = base64_decode(b64, "passkey public key")
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    match bytes.first() {
        Some(&flag) if bytes.len() == PASSKEY_PUBLIC_KEY_LENGTH + 1 => {
            if flag != SignatureScheme::Passkey.flag() {
                return Err(CryptoError::InvalidKey(format!(
                    "expected passkey flag, found {:#04x}",
                    flag
                )));
            }
            parse_passkey_public_key(&bytes[1..])
        }
        _ => parse_passkey_public_key(&bytes),
    }
}
