//! Hex and base64 helpers with context-aware error messages.

use anyhow::{anyhow, Result};
use base64::Engine;

/// Decode a hex string (with or without 0x prefix).
///
/// `context` names the value in the error, e.g. "public key".
pub fn parse_hex_bytes(hex_str: &str, context: &str) -> Result<Vec<u8>> {
    let trimmed = hex_str.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| anyhow!("Invalid {} hex '{}': {}", context, hex_str, e))
}

/// 0x-prefixed lowercase hex.
pub fn hex_encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64; `context` names the value in the error.
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

/// Decode unpadded URL-safe base64, the encoding of JWT segments.
pub fn base64url_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(b64.trim().trim_end_matches('='))
        .map_err(|e| anyhow!("Failed to decode {} from base64url: {}", context, e))
}
