//! Blocking JSON-RPC over HTTP.
//!
//! [`HttpTransport`] owns the connection pool and retry policy;
//! [`JsonRpcClient`] layers a chain's method namespace on top of it
//! (`sui_`/`suix_` or `iota_`/`iotax_`). Both fullnode families speak the
//! same JSON-RPC 2.0 dialect, so one transport serves either chain.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use unimove_types::RetryConfig;

/// Failure of a JSON-RPC round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    Http { status: u16, body: String },
    /// The server answered with a JSON-RPC error object.
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    /// Connection, DNS, TLS or timeout failure.
    Network(String),
    /// The response could not be decoded.
    Decode(String),
}

impl TransportError {
    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Http { status, .. } => *status == 429 || *status >= 500,
            TransportError::Rpc { .. } | TransportError::Decode(_) => false,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http { status, body } => {
                write!(f, "HTTP {}", status)?;
                if !body.is_empty() {
                    write!(f, ": {}", body)?;
                }
                Ok(())
            }
            TransportError::Rpc { code, message, .. } => {
                write!(f, "JSON-RPC error {}: {}", code, message)
            }
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// The `error` object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

impl TransportError {
    /// The server's error object, if the failure was a JSON-RPC error.
    pub fn as_json_rpc(&self) -> Option<JsonRpcError> {
        match self {
            TransportError::Rpc {
                code,
                message,
                data,
            } => Some(JsonRpcError {
                code: *code,
                message: message.clone(),
                data: data.clone(),
            }),
            _ => None,
        }
    }
}

impl From<JsonRpcError> for TransportError {
    fn from(e: JsonRpcError) -> Self {
        TransportError::Rpc {
            code: e.code,
            message: e.message,
            data: e.data,
        }
    }
}

/// Timeouts and retry policy for a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl TransportOptions {
    /// Default request timeout in seconds (can be overridden by env).
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read `UNIMOVE_RPC_TIMEOUT_SECS`, `UNIMOVE_RPC_CONNECT_TIMEOUT_SECS` and
    /// `UNIMOVE_RPC_RETRIES`, falling back to the defaults.
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().and_then(|v| v.parse::<u64>().ok());
        let defaults = Self::default();
        let retry = match read("UNIMOVE_RPC_RETRIES") {
            Some(n) => RetryConfig {
                retries: n as usize,
                ..defaults.retry
            },
            None => defaults.retry,
        };
        Self {
            timeout: read("UNIMOVE_RPC_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: read("UNIMOVE_RPC_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            retry,
        }
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

/// HTTP transport bound to one endpoint.
pub struct HttpTransport {
    url: String,
    agent: ureq::Agent,
    options: TransportOptions,
    next_id: AtomicU64,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("options", &self.options)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self::with_options(url, TransportOptions::from_env())
    }

    pub fn with_options(url: &str, options: TransportOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(options.timeout)
            .timeout_connect(options.connect_timeout)
            .build();
        Self {
            url: url.to_string(),
            agent,
            options,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// JSON-RPC 2.0 envelope for `method`.
    pub fn build_request(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        })
    }

    /// Send a JSON-RPC request and return its `result`, retrying transient
    /// failures per the configured policy.
    pub fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let body = self.build_request(method, params);
        let mut attempt = 0;
        loop {
            match self.send_once(&body) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.options.retry.retries => {
                    let backoff = self.options.retry.backoff_for(attempt);
                    warn!(
                        method,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying JSON-RPC request: {}",
                        e
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// POST an arbitrary JSON body to `url` and decode the JSON answer.
    pub fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        trace!(url, "POST");
        let response = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_json(body);
        match response {
            Ok(resp) => resp
                .into_json::<Value>()
                .map_err(|e| TransportError::Decode(e.to_string())),
            Err(ureq::Error::Status(status, resp)) => Err(TransportError::Http {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(TransportError::Network(t.to_string())),
        }
    }

    fn send_once(&self, body: &Value) -> Result<Value, TransportError> {
        debug!(url = %self.url, method = ?body.get("method"), "JSON-RPC request");
        let response = self.post_json(&self.url, body)?;
        decode_rpc_response(response)
    }
}

/// Extract `result` from a JSON-RPC response, or its error object.
pub fn decode_rpc_response(response: Value) -> Result<Value, TransportError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Err(TransportError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
            data: error.get("data").cloned(),
        });
    }
    response
        .get("result")
        .cloned()
        .ok_or_else(|| TransportError::Decode("response has neither result nor error".into()))
}

/// Balance summary for one coin type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub coin_type: String,
    pub coin_object_count: u64,
    pub total_balance: String,
}

impl Balance {
    pub fn total(&self) -> Option<u128> {
        self.total_balance.parse().ok()
    }
}

/// One owned coin object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: String,
    pub version: String,
    pub digest: String,
    pub balance: String,
}

/// Cursor-paginated coin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<Coin>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// JSON-RPC client for one chain's method namespace.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    transport: Arc<HttpTransport>,
    namespace: &'static str,
}

impl JsonRpcClient {
    /// `namespace` is the read-API prefix (`sui`, `iota`); the extended API
    /// uses the same prefix with an `x` suffix.
    pub fn new(transport: Arc<HttpTransport>, namespace: &'static str) -> Self {
        Self {
            transport,
            namespace,
        }
    }

    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Fully-qualified method name: `sui_getObject`, `suix_getCoins`, ...
    pub fn method_name(&self, method: &str, extended: bool) -> String {
        if extended {
            format!("{}x_{}", self.namespace, method)
        } else {
            format!("{}_{}", self.namespace, method)
        }
    }

    /// Raw call with an already fully-qualified method name.
    pub fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.transport.request(method, params)
    }

    fn call_as<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let value = self.call(method, params)?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    pub fn get_chain_identifier(&self) -> Result<String, TransportError> {
        self.call_as(&self.method_name("getChainIdentifier", false), json!([]))
    }

    pub fn get_latest_checkpoint_sequence_number(&self) -> Result<u64, TransportError> {
        let raw: String = self.call_as(
            &self.method_name("getLatestCheckpointSequenceNumber", false),
            json!([]),
        )?;
        raw.parse()
            .map_err(|_| TransportError::Decode(format!("invalid checkpoint number '{}'", raw)))
    }

    pub fn get_reference_gas_price(&self) -> Result<u64, TransportError> {
        let raw: Value =
            self.call_as(&self.method_name("getReferenceGasPrice", true), json!([]))?;
        match &raw {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| TransportError::Decode(format!("invalid gas price {}", raw)))
    }

    pub fn get_balance(
        &self,
        owner: &str,
        coin_type: Option<&str>,
    ) -> Result<Balance, TransportError> {
        self.call_as(
            &self.method_name("getBalance", true),
            json!([owner, coin_type]),
        )
    }

    pub fn get_coins(
        &self,
        owner: &str,
        coin_type: Option<&str>,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<CoinPage, TransportError> {
        self.call_as(
            &self.method_name("getCoins", true),
            json!([owner, coin_type, cursor, limit]),
        )
    }

    pub fn get_object(&self, object_id: &str, show_content: bool) -> Result<Value, TransportError> {
        self.call(
            &self.method_name("getObject", false),
            json!([object_id, { "showType": true, "showOwner": true, "showContent": show_content }]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(namespace: &'static str) -> JsonRpcClient {
        let transport = HttpTransport::with_options(
            "http://127.0.0.1:1",
            TransportOptions {
                retry: RetryConfig::none(),
                ..TransportOptions::default()
            },
        );
        JsonRpcClient::new(Arc::new(transport), namespace)
    }

    #[test]
    fn test_method_names_follow_namespace() {
        let sui = client("sui");
        assert_eq!(sui.method_name("getObject", false), "sui_getObject");
        assert_eq!(sui.method_name("getCoins", true), "suix_getCoins");
        let iota = client("iota");
        assert_eq!(iota.method_name("getBalance", true), "iotax_getBalance");
    }

    #[test]
    fn test_request_ids_increase() {
        let sui = client("sui");
        let a = sui.transport().build_request("sui_getChainIdentifier", json!([]));
        let b = sui.transport().build_request("sui_getChainIdentifier", json!([]));
        assert_eq!(a["jsonrpc"], "2.0");
        assert!(b["id"].as_u64().unwrap() > a["id"].as_u64().unwrap());
    }

    #[test]
    fn test_decode_rpc_error() {
        let err = decode_rpc_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid params" }
        }))
        .unwrap_err();
        assert!(matches!(err, TransportError::Rpc { code: -32602, .. }));
        assert!(!err.is_retryable());
        let rpc = err.as_json_rpc().unwrap();
        assert_eq!(rpc.message, "Invalid params");
        assert_eq!(rpc.to_string(), err.to_string());
        assert_eq!(TransportError::from(rpc), err);
        assert!(TransportError::Network("reset".into()).as_json_rpc().is_none());
    }

    #[test]
    fn test_decode_rpc_result() {
        let value = decode_rpc_response(json!({ "jsonrpc": "2.0", "id": 1, "result": "35834a8a" }))
            .unwrap();
        assert_eq!(value, json!("35834a8a"));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let err = client("sui").get_chain_identifier().unwrap_err();
        assert!(matches!(err, TransportError::Network(_)), "got {:?}", err);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Http { status: 503, body: String::new() }.is_retryable());
        assert!(TransportError::Http { status: 429, body: String::new() }.is_retryable());
        assert!(!TransportError::Http { status: 404, body: String::new() }.is_retryable());
    }
}
