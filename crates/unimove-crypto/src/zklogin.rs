//! zkLogin helpers that need no prover: JWT decoding, ephemeral key
//! extension and randomness.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unimove_types::encoding::base64url_decode;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::PublicKey;

/// Claims of a decoded OpenID JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedJwt {
    pub header: Value,
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub nonce: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub raw_iss: String,
    /// All payload claims.
    pub payload: Value,
}

fn segment(part: &str, what: &str) -> CryptoResult<Value> {
    let bytes = base64url_decode(part, what).map_err(|e| CryptoError::InvalidJwt(e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CryptoError::InvalidJwt(format!("{} is not JSON: {}", what, e)))
}

/// Google issues tokens with a bare host as `iss`.
fn normalize_iss(iss: &str) -> String {
    if iss == "accounts.google.com" {
        "https://accounts.google.com".to_string()
    } else {
        iss.to_string()
    }
}

/// Decode (without verifying) a JWT's header and payload.
pub fn decode_jwt(jwt: &str) -> CryptoResult<DecodedJwt> {
    let parts: Vec<&str> = jwt.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(CryptoError::InvalidJwt(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }
    let header = segment(parts[0], "JWT header")?;
    let payload = segment(parts[1], "JWT payload")?;

    let claim = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_string);
    let raw_iss = claim("iss").ok_or_else(|| CryptoError::InvalidJwt("missing iss".into()))?;
    let sub = claim("sub").ok_or_else(|| CryptoError::InvalidJwt("missing sub".into()))?;
    let aud = match payload.get("aud") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) if items.len() == 1 => items[0]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CryptoError::InvalidJwt("aud entry is not a string".into()))?,
        Some(Value::Array(_)) => {
            return Err(CryptoError::InvalidJwt("multiple aud values are not supported".into()))
        }
        _ => return Err(CryptoError::InvalidJwt("missing aud".into())),
    };

    Ok(DecodedJwt {
        iss: normalize_iss(&raw_iss),
        raw_iss,
        sub,
        aud,
        nonce: claim("nonce"),
        exp: payload.get("exp").and_then(Value::as_u64),
        iat: payload.get("iat").and_then(Value::as_u64),
        header,
        payload,
    })
}

/// The ephemeral key in the form the prover expects: base64 flagged bytes.
pub fn get_extended_ephemeral_public_key(public_key: &PublicKey) -> String {
    public_key.to_base64()
}

/// 128 bits of randomness as a decimal string.
pub fn generate_randomness() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    u128::from_be_bytes(bytes).to_string()
}
