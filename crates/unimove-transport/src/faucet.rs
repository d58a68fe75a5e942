//! Faucet requests for test networks.

use std::fmt;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::http::{HttpTransport, TransportError};

/// Faucet endpoint path. Sui serves `/v2/gas`, IOTA still serves `/v1/gas`.
pub const SUI_FAUCET_PATH: &str = "/v2/gas";
pub const IOTA_FAUCET_PATH: &str = "/v1/gas";

#[derive(Debug, Clone, PartialEq)]
pub enum FaucetError {
    Transport(TransportError),
    /// The faucet answered but refused the request.
    Rejected(String),
    /// 429 from the faucet.
    RateLimited,
}

impl fmt::Display for FaucetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaucetError::Transport(e) => write!(f, "Faucet request failed: {}", e),
            FaucetError::Rejected(msg) => write!(f, "Faucet rejected request: {}", msg),
            FaucetError::RateLimited => {
                f.write_str("Too many requests from this client have been sent to the faucet")
            }
        }
    }
}

impl std::error::Error for FaucetError {}

impl From<TransportError> for FaucetError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Http { status: 429, .. } => FaucetError::RateLimited,
            other => FaucetError::Transport(other),
        }
    }
}

pub fn faucet_request_body(recipient: &str) -> Value {
    json!({ "FixedAmountRequest": { "recipient": recipient } })
}

/// Pull a failure message out of a faucet response, if it reports one.
///
/// The v1 shape carries `error: string | null`; v2 reports
/// `status: { Failure: { internal: string } }`.
pub fn faucet_failure(response: &Value) -> Option<String> {
    if let Some(msg) = response.get("error").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    let failure = response.get("status")?.get("Failure")?;
    Some(
        failure
            .get("internal")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| failure.to_string()),
    )
}

/// Ask the faucet at `host` to fund `recipient`.
pub fn request_from_faucet(
    transport: &HttpTransport,
    host: &str,
    path: &str,
    recipient: &str,
) -> Result<Value, FaucetError> {
    let url = format!("{}{}", host.trim_end_matches('/'), path);
    debug!(%url, recipient, "faucet request");
    let response = transport.post_json(&url, &faucet_request_body(recipient))?;
    if let Some(msg) = faucet_failure(&response) {
        return Err(FaucetError::Rejected(msg));
    }
    info!(recipient, "faucet request accepted");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_shape() {
        let body = faucet_request_body("0xabc");
        assert_eq!(body["FixedAmountRequest"]["recipient"], "0xabc");
    }

    #[test]
    fn test_failure_extraction() {
        assert_eq!(
            faucet_failure(&json!({ "task": null, "error": "bad address" })),
            Some("bad address".to_string())
        );
        assert_eq!(
            faucet_failure(&json!({ "status": { "Failure": { "internal": "empty" } } })),
            Some("empty".to_string())
        );
        assert_eq!(faucet_failure(&json!({ "status": "Success", "coins_sent": [] })), None);
        assert_eq!(faucet_failure(&json!({ "task": "abc", "error": null })), None);
    }

    #[test]
    fn test_rate_limit_maps_from_http_status() {
        let err: FaucetError = TransportError::Http {
            status: 429,
            body: String::new(),
        }
        .into();
        assert_eq!(err, FaucetError::RateLimited);
    }
}
