//! Bech32 private key text form.
//!
//! Payload is `flag || secret_key` (33 bytes). Sui keys use the human
//! readable part `suiprivkey`, IOTA keys `iotaprivkey`.

use fastcrypto::encoding::Bech32;
use unimove_types::{ParsedKeypair, SignatureScheme};

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::SECRET_KEY_LENGTH;

pub const SUI_PRIVATE_KEY_PREFIX: &str = "suiprivkey";
pub const IOTA_PRIVATE_KEY_PREFIX: &str = "iotaprivkey";

pub fn encode_private_key(
    hrp: &str,
    scheme: SignatureScheme,
    secret: &[u8],
) -> CryptoResult<String> {
    if !scheme.has_secret_key() {
        return Err(CryptoError::UnsupportedScheme(scheme));
    }
    if secret.len() != SECRET_KEY_LENGTH {
        return Err(CryptoError::InvalidKey(format!(
            "expected {} secret key bytes, got {}",
            SECRET_KEY_LENGTH,
            secret.len()
        )));
    }
    let mut payload = Vec::with_capacity(1 + SECRET_KEY_LENGTH);
    payload.push(scheme.flag());
    payload.extend_from_slice(secret);
    Bech32::encode(payload, hrp).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

pub fn decode_private_key(hrp: &str, value: &str) -> CryptoResult<ParsedKeypair> {
    let payload = Bech32::decode(value.trim(), hrp).map_err(|e| {
        CryptoError::InvalidKey(format!("invalid {} private key: {}", hrp, e))
    })?;
    let (&flag, secret) = payload
        .split_first()
        .ok_or_else(|| CryptoError::InvalidKey("empty private key payload".into()))?;
    let schema = SignatureScheme::from_flag(flag).ok_or(CryptoError::UnknownFlag(flag))?;
    if !schema.has_secret_key() {
        return Err(CryptoError::UnsupportedScheme(schema));
    }
    let secret_key: [u8; SECRET_KEY_LENGTH] = secret.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "expected {} secret key bytes, got {}",
            SECRET_KEY_LENGTH,
            secret.len()
        ))
    })?;
    Ok(ParsedKeypair { schema, secret_key })
}
