//! The operation table behind [`crate::dispatch`].
//!
//! Every operation takes its arguments as a JSON list and answers with
//! JSON. Operations generic over `C` are registered for every available
//! chain; [`decode_jwt`] and [`get_network`] only for the chain that has the
//! underlying module.
//!
//! | operation | arguments |
//! |-----------|-----------|
//! | `get_fullnode_url` | `[network?]` |
//! | `parse_struct_tag` | `[tag]` |
//! | `normalize_struct_tag` | `[tag \| {address, module, name, typeParams}]` |
//! | `decode_private_key` | `[secretKey]` |
//! | `generate_keypair` | `[scheme?]` |
//! | `sign_personal_message` | `[message, secretKey?]` |
//! | `verify_personal_message` | `[message, signature, address?]` |
//! | `client_query` | `[method, params?, network \| url?]` |
//! | `client_queries` | `[[{method, params?}, ...], network \| url?]` |
//! | `client_infinite_query` | `[method, params?, {cursor?, limit?, maxPages?}?, network \| url?]` |
//! | `client_mutation` | `[method, params?, network \| url?]` |
//! | `request_faucet` | `[recipient, network?]` |
//! | `connect_wallet` | `[secretKey?]` |
//! | `disconnect_wallet`, `auto_connect_wallet` | `[]` |
//! | `current_wallet`, `wallets`, `current_account`, `accounts` | `[]` |
//! | `switch_account` | `[address]` |
//! | `sign_transaction` | `[txBytesBase64 \| transaction, secretKey?]` |
//! | `sign_and_execute_transaction` | `[txBytesBase64 \| transaction, secretKey?, network \| url?, options?]` |
//! | `decode_jwt` (Sui) | `[jwt]` |
//! | `get_network` (IOTA) | `[network?]` |
//!
//! Network calls run on tokio's blocking pool, so awaiting the `client_*`
//! operations, `request_faucet` or `sign_and_execute_transaction` needs a
//! tokio runtime. Their arguments are validated before anything is sent.

use std::sync::Arc;

use futures::future::{self, FutureExt};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use unimove_crypto::Keypair;
use unimove_transport::Network;
use unimove_types::encoding::base64_decode;
use unimove_types::{SignatureScheme, StructTag};

use crate::chains::transaction::{sign_transaction_bytes, SignedTransaction};
use crate::chains::{
    Chain, ClientNamespace, FaucetNamespace, Iota, KeypairModule, KeypairNamespace, RpcClient,
    Sui, Transaction, UtilsNamespace, VerifyNamespace,
};
use crate::dispatch::{Operation, OperationFuture};
use crate::error::{UnimoveError, UnimoveResult};
use crate::sdk::NormalizedSdk;
use crate::wallet::wallets;

macro_rules! sync_operation {
    ($f:ident) => {{
        fn operation<C: Chain>(args: Vec<Value>) -> OperationFuture {
            future::ready($f::<C>(&args)).boxed()
        }
        operation::<C> as Operation
    }};
}

/// Operations every available chain offers.
pub fn standard_operations<C: Chain>() -> Vec<(&'static str, Operation)> {
    vec![
        ("get_fullnode_url", sync_operation!(get_fullnode_url)),
        ("parse_struct_tag", sync_operation!(parse_struct_tag)),
        ("normalize_struct_tag", sync_operation!(normalize_struct_tag)),
        ("decode_private_key", sync_operation!(decode_private_key)),
        ("generate_keypair", sync_operation!(generate_keypair)),
        ("sign_personal_message", sync_operation!(sign_personal_message)),
        ("verify_personal_message", sync_operation!(verify_personal_message)),
        ("client_query", client_query::<C> as Operation),
        ("client_queries", client_queries::<C> as Operation),
        ("client_infinite_query", client_infinite_query::<C> as Operation),
        ("client_mutation", client_mutation::<C> as Operation),
        ("request_faucet", request_faucet::<C> as Operation),
        ("connect_wallet", sync_operation!(connect_wallet)),
        ("disconnect_wallet", sync_operation!(disconnect_wallet)),
        ("auto_connect_wallet", sync_operation!(auto_connect_wallet)),
        ("current_wallet", sync_operation!(current_wallet)),
        ("wallets", sync_operation!(list_wallets)),
        ("current_account", sync_operation!(current_account)),
        ("accounts", sync_operation!(accounts)),
        ("switch_account", sync_operation!(switch_account)),
        ("sign_transaction", sync_operation!(sign_transaction)),
        (
            "sign_and_execute_transaction",
            sign_and_execute_transaction::<C> as Operation,
        ),
    ]
}

fn encode<T: Serialize>(value: &T) -> UnimoveResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| UnimoveError::invalid_argument(format!("unserializable result: {}", e)))
}

fn required_str<'a>(args: &'a [Value], index: usize, name: &str) -> UnimoveResult<&'a str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(UnimoveError::invalid_argument(format!(
            "'{}' must be a string, got {}",
            name, other
        ))),
        None => Err(UnimoveError::invalid_argument(format!(
            "missing argument '{}'",
            name
        ))),
    }
}

fn optional_str<'a>(args: &'a [Value], index: usize, name: &str) -> UnimoveResult<Option<&'a str>> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_str(args, index, name).map(Some),
    }
}

fn network_arg(args: &[Value], index: usize, default: Network) -> UnimoveResult<Network> {
    match optional_str(args, index, "network")? {
        Some(name) => Ok(name.parse::<Network>()?),
        None => Ok(default),
    }
}

fn keypair_module<C: Chain>(scheme: SignatureScheme) -> UnimoveResult<&'static KeypairModule<C>> {
    let keypairs = &C::modules().keypairs;
    match scheme {
        SignatureScheme::Ed25519 => Ok(&keypairs.ed25519),
        SignatureScheme::Secp256k1 => Ok(&keypairs.secp256k1),
        SignatureScheme::Secp256r1 => Ok(&keypairs.secp256r1),
        other => Err(UnimoveError::invalid_argument(format!(
            "cannot sign with {} keys",
            other
        ))),
    }
}

/// The key named by `secret`, else the wallet's active account.
fn signing_keypair<C: Chain>(secret: Option<&str>) -> UnimoveResult<Arc<Keypair>> {
    match secret {
        Some(text) => {
            let parsed = NormalizedSdk::<C>::new().decode_private_key(text)?;
            Ok(Arc::new(Keypair::from_parsed(&parsed)?))
        }
        None => Ok(Arc::clone(wallets().require_current(C::ID)?.keypair())),
    }
}

fn get_fullnode_url<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let network = network_arg(args, 0, Network::Mainnet)?;
    Ok(json!(NormalizedSdk::<C>::new().get_fullnode_url(network)))
}

fn parse_struct_tag<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let input = required_str(args, 0, "tag")?;
    encode(&NormalizedSdk::<C>::new().parse_struct_tag(input)?)
}

fn normalize_struct_tag<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let sdk = NormalizedSdk::<C>::new();
    let tag = match args.first() {
        Some(Value::String(s)) => sdk.parse_struct_tag(s)?,
        Some(value @ Value::Object(_)) => serde_json::from_value::<StructTag>(value.clone())
            .map_err(|e| UnimoveError::invalid_argument(format!("invalid struct tag: {}", e)))?,
        _ => {
            return Err(UnimoveError::invalid_argument(
                "'tag' must be a string or a struct tag object",
            ))
        }
    };
    encode(&sdk.normalize_struct_tag(&tag))
}

fn decode_private_key<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let text = required_str(args, 0, "secretKey")?;
    let parsed = NormalizedSdk::<C>::new().decode_private_key(text)?;
    let address = Keypair::from_parsed(&parsed)?.to_address();
    let mut value = encode(&parsed)?;
    value["address"] = json!(address);
    Ok(value)
}

fn generate_keypair<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let scheme = match optional_str(args, 0, "scheme")? {
        Some(name) => name
            .parse::<SignatureScheme>()
            .map_err(UnimoveError::InvalidArgument)?,
        None => SignatureScheme::Ed25519,
    };
    let module = keypair_module::<C>(scheme)?;
    let keypair = module.generate()?;
    Ok(json!({
        "scheme": scheme,
        "address": keypair.to_address(),
        "publicKey": keypair.public_key().to_base64(),
        "secretKey": module.export_secret_key(&keypair)?,
    }))
}

fn sign_personal_message<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let message = required_str(args, 0, "message")?;
    let keypair = signing_keypair::<C>(optional_str(args, 1, "secretKey")?)?;
    let module = keypair_module::<C>(keypair.scheme())?;
    encode(&module.sign_personal_message(&keypair, message.as_bytes())?)
}

fn verify_personal_message<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let message = required_str(args, 0, "message")?;
    let signature = required_str(args, 1, "signature")?;
    let address = optional_str(args, 2, "address")?;
    let signer = C::modules()
        .verify
        .verify_personal_message_signature(message.as_bytes(), signature, address)?;
    Ok(json!({
        "valid": true,
        "address": signer.to_address(),
        "publicKey": signer.to_base64(),
        "scheme": signer.scheme(),
    }))
}

/// Fullnode URL from a network name or literal URL argument.
fn endpoint_arg<C: Chain>(args: &[Value], index: usize) -> UnimoveResult<String> {
    let client = &C::modules().client;
    Ok(match optional_str(args, index, "network")? {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        Some(name) => client.get_fullnode_url(name.parse::<Network>()?).to_string(),
        None => client.get_fullnode_url(Network::Mainnet).to_string(),
    })
}

fn params_arg(args: &[Value], index: usize) -> Value {
    match args.get(index) {
        None | Some(Value::Null) => json!([]),
        Some(value) => value.clone(),
    }
}

/// Method, params and endpoint for `client_query`.
fn query_request<C: Chain>(args: &[Value]) -> UnimoveResult<(String, Value, String)> {
    let method = required_str(args, 0, "method")?.to_string();
    Ok((method, params_arg(args, 1), endpoint_arg::<C>(args, 2)?))
}

/// Run `call` against a fresh client for `url` on the blocking pool.
fn blocking_call<C, F>(url: &str, what: &'static str, call: F) -> OperationFuture
where
    C: Chain,
    F: FnOnce(&crate::sdk::Client<C>) -> UnimoveResult<Value> + Send + 'static,
{
    let client = NormalizedSdk::<C>::new().create_client(url);
    async move {
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| UnimoveError::Unavailable(format!("{} task failed: {}", what, e)))?
    }
    .boxed()
}

fn client_query<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (method, params, url) = match query_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, %method, %url, "client query");
    blocking_call::<C, _>(&url, "client query", move |client| {
        Ok(client.query(&method, params)?)
    })
}

/// The method name without its `sui_`/`iotax_` namespace.
fn bare_method(method: &str) -> &str {
    method.split_once('_').map_or(method, |(_, name)| name)
}

/// Methods that submit or simulate transactions.
const MUTATION_METHODS: &[&str] = &[
    "executeTransactionBlock",
    "dryRunTransactionBlock",
    "devInspectTransactionBlock",
];

fn mutation_request<C: Chain>(args: &[Value]) -> UnimoveResult<(String, Value, String)> {
    let (method, params, url) = query_request::<C>(args)?;
    if !MUTATION_METHODS.contains(&bare_method(&method)) {
        return Err(UnimoveError::invalid_argument(format!(
            "'{}' is not a mutation (expected one of: {})",
            method,
            MUTATION_METHODS.join(", ")
        )));
    }
    Ok((method, params, url))
}

fn client_mutation<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (method, params, url) = match mutation_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, %method, %url, "client mutation");
    blocking_call::<C, _>(&url, "client mutation", move |client| {
        Ok(client.query(&method, params)?)
    })
}

/// One entry of a `client_queries` batch.
#[derive(Debug, Clone, PartialEq)]
struct BatchQuery {
    method: String,
    params: Value,
}

fn batch_request<C: Chain>(args: &[Value]) -> UnimoveResult<(Vec<BatchQuery>, String)> {
    let entries = match args.first() {
        Some(Value::Array(entries)) => entries,
        _ => {
            return Err(UnimoveError::invalid_argument(
                "'queries' must be an array of {method, params?} objects",
            ))
        }
    };
    let queries = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.get("method").and_then(Value::as_str) {
            Some(method) => Ok(BatchQuery {
                method: method.to_string(),
                params: entry
                    .get("params")
                    .filter(|p| !p.is_null())
                    .cloned()
                    .unwrap_or_else(|| json!([])),
            }),
            None => Err(UnimoveError::invalid_argument(format!(
                "query {} has no 'method'",
                i
            ))),
        })
        .collect::<UnimoveResult<Vec<_>>>()?;
    Ok((queries, endpoint_arg::<C>(args, 1)?))
}

/// Every query runs; each slot of the answer carries `data` or `error`.
fn client_queries<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (queries, url) = match batch_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, count = queries.len(), %url, "client queries");
    blocking_call::<C, _>(&url, "client queries", move |client| {
        let results = queries
            .into_iter()
            .map(|q| match client.query(&q.method, q.params) {
                Ok(data) => json!({ "data": data, "error": null }),
                Err(e) => json!({ "data": null, "error": e.to_string() }),
            })
            .collect();
        Ok(Value::Array(results))
    })
}

/// Paginated methods and the position of their cursor parameter. The page
/// limit follows the cursor.
const PAGINATED_METHODS: &[(&str, usize)] = &[
    ("getAllCoins", 1),
    ("getCoins", 2),
    ("getDynamicFields", 1),
    ("getOwnedObjects", 2),
    ("queryEvents", 1),
    ("queryTransactionBlocks", 1),
];

fn cursor_position(method: &str) -> Option<usize> {
    let bare = bare_method(method);
    PAGINATED_METHODS
        .iter()
        .find(|(name, _)| *name == bare)
        .map(|(_, index)| *index)
}

/// `base` with `cursor` and `limit` placed after the leading arguments.
fn page_params(base: &[Value], cursor_index: usize, cursor: &Value, limit: Option<u64>) -> Vec<Value> {
    let mut params: Vec<Value> = base.to_vec();
    if params.len() < cursor_index + 2 {
        params.resize(cursor_index + 2, Value::Null);
    }
    params[cursor_index] = cursor.clone();
    params[cursor_index + 1] = limit.map_or(Value::Null, |l| json!(l));
    params
}

#[derive(Debug, Clone, PartialEq)]
struct InfiniteQuery {
    method: String,
    params: Vec<Value>,
    cursor_index: usize,
    cursor: Value,
    limit: Option<u64>,
    max_pages: usize,
}

impl InfiniteQuery {
    /// Fetch pages until `max_pages` or the last page, in the shape of
    /// `{pages, pageParams, hasNextPage, nextCursor}`.
    fn run<R: RpcClient>(self, client: &R) -> UnimoveResult<Value> {
        let mut pages = Vec::new();
        let mut page_params_seen = Vec::new();
        let mut cursor = self.cursor;
        let mut has_next = true;
        while has_next && pages.len() < self.max_pages {
            let params = page_params(&self.params, self.cursor_index, &cursor, self.limit);
            let page = client.query(&self.method, Value::Array(params))?;
            has_next = page
                .get("hasNextPage")
                .and_then(Value::as_bool)
                .ok_or_else(|| {
                    UnimoveError::Unavailable(format!("{} did not return a page", self.method))
                })?;
            page_params_seen.push(cursor);
            cursor = page.get("nextCursor").cloned().unwrap_or(Value::Null);
            pages.push(page);
        }
        Ok(json!({
            "pages": pages,
            "pageParams": page_params_seen,
            "hasNextPage": has_next,
            "nextCursor": cursor,
        }))
    }
}

fn infinite_request<C: Chain>(args: &[Value]) -> UnimoveResult<(InfiniteQuery, String)> {
    let method = required_str(args, 0, "method")?.to_string();
    let cursor_index = cursor_position(&method).ok_or_else(|| {
        UnimoveError::invalid_argument(format!("'{}' is not a paginated method", method))
    })?;
    let params = match params_arg(args, 1) {
        Value::Array(params) => params,
        other => {
            return Err(UnimoveError::invalid_argument(format!(
                "'params' must be an array, got {}",
                other
            )))
        }
    };
    let options = match args.get(2) {
        None | Some(Value::Null) => json!({}),
        Some(value @ Value::Object(_)) => value.clone(),
        Some(other) => {
            return Err(UnimoveError::invalid_argument(format!(
                "'options' must be an object, got {}",
                other
            )))
        }
    };
    let max_pages = match options.get("maxPages") {
        None => 1,
        Some(value) => value
            .as_u64()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .ok_or_else(|| UnimoveError::invalid_argument("'maxPages' must be a positive integer"))?,
    };
    let query = InfiniteQuery {
        method,
        params,
        cursor_index,
        cursor: options.get("cursor").cloned().unwrap_or(Value::Null),
        limit: options.get("limit").and_then(Value::as_u64),
        max_pages,
    };
    Ok((query, endpoint_arg::<C>(args, 3)?))
}

fn client_infinite_query<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (query, url) = match infinite_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, method = %query.method, %url, "client infinite query");
    blocking_call::<C, _>(&url, "client infinite query", move |client| query.run(client))
}

/// Normalized recipient and faucet host for `request_faucet`.
fn faucet_request<C: Chain>(args: &[Value]) -> UnimoveResult<(String, &'static str)> {
    let recipient = required_str(args, 0, "recipient")?;
    let modules = C::modules();
    if !modules.utils.is_valid_address(recipient) {
        return Err(UnimoveError::invalid_argument(format!(
            "invalid recipient address: {}",
            recipient
        )));
    }
    let network = network_arg(args, 1, Network::Testnet)?;
    let host = modules.faucet.get_faucet_host(network).ok_or_else(|| {
        UnimoveError::Unavailable(format!(
            "{} has no faucet on {}",
            C::ID.display_name(),
            network
        ))
    })?;
    Ok((modules.utils.normalize_address(recipient), host))
}

fn request_faucet<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (recipient, host) = match faucet_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, %recipient, host, "faucet request");
    let faucet = &C::modules().faucet;
    async move {
        tokio::task::spawn_blocking(move || faucet.request_from_faucet(host, &recipient))
            .await
            .map_err(|e| UnimoveError::Unavailable(format!("faucet task failed: {}", e)))?
            .map_err(UnimoveError::from)
    }
    .boxed()
}

fn connect_wallet<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let keypair = match optional_str(args, 0, "secretKey")? {
        Some(text) => {
            let parsed = NormalizedSdk::<C>::new().decode_private_key(text)?;
            Keypair::from_parsed(&parsed)?
        }
        None => NormalizedSdk::<C>::new().create_ed25519_keypair()?,
    };
    Ok(wallets().connect(C::ID, keypair).to_json())
}

fn disconnect_wallet<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    wallets().disconnect(C::ID);
    Ok(Value::Null)
}

fn auto_connect_wallet<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    let account = wallets().auto_connect(C::ID);
    Ok(json!({
        "status": "attempted",
        "isConnected": account.is_some(),
        "currentAccount": account.map(|a| a.to_json()),
    }))
}

fn current_wallet<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    let wallet = wallets().describe(C::ID);
    let connected = wallet["connected"].as_bool().unwrap_or(false);
    let (status, current) = if connected {
        ("connected", wallet)
    } else {
        ("disconnected", Value::Null)
    };
    Ok(json!({
        "connectionStatus": status,
        "isConnected": connected,
        "currentWallet": current,
    }))
}

/// The wallets available on the chain: the in-memory session only.
fn list_wallets<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    Ok(json!([wallets().describe(C::ID)]))
}

fn current_account<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    Ok(wallets()
        .current(C::ID)
        .map(|account| account.to_json())
        .unwrap_or(Value::Null))
}

fn accounts<C: Chain>(_args: &[Value]) -> UnimoveResult<Value> {
    Ok(Value::Array(
        wallets()
            .accounts(C::ID)
            .iter()
            .map(|account| account.to_json())
            .collect(),
    ))
}

fn switch_account<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    let address = required_str(args, 0, "address")?;
    Ok(wallets().switch(C::ID, address)?.to_json())
}

fn sign_transaction<C: Chain>(args: &[Value]) -> UnimoveResult<Value> {
    encode(&signed_transaction::<C>(args)?)
}

/// Sign `args[0]` with `args[1]` or the wallet's active account.
fn signed_transaction<C: Chain>(args: &[Value]) -> UnimoveResult<SignedTransaction> {
    let keypair = signing_keypair::<C>(optional_str(args, 1, "secretKey")?)?;
    let bytes = match args.first() {
        Some(Value::String(b64)) => base64_decode(b64, "transaction bytes")
            .map_err(|e| UnimoveError::invalid_argument(e.to_string()))?,
        Some(value @ Value::Object(_)) => {
            let mut tx = Transaction::<C>::from_json(value.clone())?;
            tx.set_sender_if_not_set(&keypair.to_address())?;
            tx.build()?
        }
        _ => {
            return Err(UnimoveError::invalid_argument(
                "'transaction' must be base64 bytes or a transaction object",
            ))
        }
    };
    Ok(sign_transaction_bytes(&keypair, &bytes))
}

fn execute_request<C: Chain>(args: &[Value]) -> UnimoveResult<(Value, String)> {
    let signed = signed_transaction::<C>(args)?;
    let url = endpoint_arg::<C>(args, 2)?;
    let options = match args.get(3) {
        None | Some(Value::Null) => json!({ "showEffects": true }),
        Some(value @ Value::Object(_)) => value.clone(),
        Some(other) => {
            return Err(UnimoveError::invalid_argument(format!(
                "'options' must be an object, got {}",
                other
            )))
        }
    };
    Ok((json!([signed.bytes, [signed.signature], options]), url))
}

/// Sign, then submit with `executeTransactionBlock`.
fn sign_and_execute_transaction<C: Chain>(args: Vec<Value>) -> OperationFuture {
    let (params, url) = match execute_request::<C>(&args) {
        Ok(request) => request,
        Err(e) => return future::ready(Err(e)).boxed(),
    };
    debug!(chain = %C::ID, %url, "sign and execute transaction");
    blocking_call::<C, _>(&url, "transaction execution", move |client| {
        Ok(client.query("executeTransactionBlock", params)?)
    })
}

/// Decode a zkLogin JWT. Sui only.
pub fn decode_jwt(args: Vec<Value>) -> OperationFuture {
    let result = required_str(&args, 0, "jwt")
        .and_then(|jwt| Ok(Sui::modules().zklogin.decode_jwt(jwt)?))
        .and_then(|decoded| encode(&decoded));
    future::ready(result).boxed()
}

/// One entry of the IOTA network table. IOTA only.
pub fn get_network(args: Vec<Value>) -> OperationFuture {
    let tools = Iota::modules().client.network_tools();
    let result = network_arg(&args, 0, tools.get_default_network()).and_then(|network| {
        let entry = tools
            .get_network(network)
            .ok_or_else(|| UnimoveError::Unavailable(format!("unknown IOTA network {}", network)))?;
        encode(entry)
    });
    future::ready(result).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn run<C: Chain>(name: &str, args: Vec<Value>) -> UnimoveResult<Value> {
        let (_, op) = standard_operations::<C>()
            .into_iter()
            .find(|(n, _)| *n == name)
            .unwrap();
        block_on(op(args))
    }

    #[test]
    fn test_fullnode_url_defaults_to_mainnet() {
        let url = run::<Iota>("get_fullnode_url", vec![]).unwrap();
        assert_eq!(url, json!("https://api.mainnet.iota.cafe"));
        let err = run::<Sui>("get_fullnode_url", vec![json!("moonnet")]).unwrap_err();
        assert!(err.to_string().contains("moonnet"));
    }

    #[test]
    fn test_normalize_accepts_object() {
        let tag = json!({ "address": "0x0002", "module": "coin", "name": "Coin", "typeParams": [] });
        let out = run::<Sui>("normalize_struct_tag", vec![tag]).unwrap();
        assert_eq!(out["address"], "0x2");
    }

    #[test]
    fn test_generate_then_decode() {
        let generated = run::<Iota>("generate_keypair", vec![json!("secp256r1")]).unwrap();
        let secret = generated["secretKey"].as_str().unwrap();
        assert!(secret.starts_with("iotaprivkey"));
        let decoded = run::<Iota>("decode_private_key", vec![json!(secret)]).unwrap();
        assert_eq!(decoded["schema"], "Secp256r1");
        assert_eq!(decoded["address"], generated["address"]);
    }

    #[test]
    fn test_generate_rejects_passkey() {
        assert!(run::<Sui>("generate_keypair", vec![json!("passkey")]).is_err());
    }

    #[test]
    fn test_sign_and_verify_with_explicit_key() {
        let generated = run::<Sui>("generate_keypair", vec![]).unwrap();
        let secret = generated["secretKey"].clone();
        let signed = run::<Sui>("sign_personal_message", vec![json!("gm"), secret]).unwrap();
        let verified = run::<Sui>(
            "verify_personal_message",
            vec![json!("gm"), signed["signature"].clone(), generated["address"].clone()],
        )
        .unwrap();
        assert_eq!(verified["valid"], true);
        assert_eq!(verified["address"], generated["address"]);
    }

    #[test]
    fn test_missing_argument_is_reported() {
        let err = run::<Sui>("parse_struct_tag", vec![]).unwrap_err();
        assert!(matches!(err, UnimoveError::InvalidArgument(_)));
    }

    #[test]
    fn test_faucet_on_mainnet_is_unavailable() {
        let err = run::<Sui>("request_faucet", vec![json!("0x1"), json!("mainnet")]).unwrap_err();
        assert!(matches!(err, UnimoveError::Unavailable(_)));
    }

    #[test]
    fn test_get_network_default() {
        let network = block_on(get_network(vec![])).unwrap();
        assert_eq!(network["chain"], "iota:mainnet");
    }

    #[test]
    fn test_bare_method_strips_namespace() {
        assert_eq!(bare_method("suix_getCoins"), "getCoins");
        assert_eq!(bare_method("iota_executeTransactionBlock"), "executeTransactionBlock");
        assert_eq!(bare_method("getCoins"), "getCoins");
    }

    #[test]
    fn test_client_mutation_accepts_only_mutations() {
        let err = run::<Sui>("client_mutation", vec![json!("getObject"), json!(["0x5"])]).unwrap_err();
        assert!(err.to_string().contains("not a mutation"));

        let (method, params, url) = mutation_request::<Iota>(&[
            json!("iota_dryRunTransactionBlock"),
            json!(["AAAA"]),
            json!("testnet"),
        ])
        .unwrap();
        assert_eq!(method, "iota_dryRunTransactionBlock");
        assert_eq!(params, json!(["AAAA"]));
        assert_eq!(url, "https://api.testnet.iota.cafe");
    }

    #[test]
    fn test_client_queries_validates_batch() {
        let err = run::<Sui>("client_queries", vec![json!("getObject")]).unwrap_err();
        assert!(matches!(err, UnimoveError::InvalidArgument(_)));
        let err = run::<Sui>("client_queries", vec![json!([{ "params": [] }])]).unwrap_err();
        assert!(err.to_string().contains("query 0 has no 'method'"));

        let (queries, url) = batch_request::<Sui>(&[
            json!([
                { "method": "getChainIdentifier" },
                { "method": "getObject", "params": ["0x5"] },
            ]),
            json!("devnet"),
        ])
        .unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].params, json!([]));
        assert_eq!(queries[1].params, json!(["0x5"]));
        assert_eq!(url, "https://fullnode.devnet.sui.io:443");
    }

    #[test]
    fn test_page_params_place_cursor_and_limit() {
        let owner = json!("0xa");
        assert_eq!(
            page_params(&[owner.clone()], 2, &json!("c1"), Some(5)),
            vec![owner.clone(), Value::Null, json!("c1"), json!(5)]
        );
        assert_eq!(
            page_params(&[owner.clone(), json!("0x2::sui::SUI"), json!("old"), json!(9)], 2, &Value::Null, None),
            vec![owner, json!("0x2::sui::SUI"), Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_client_infinite_query_validates_arguments() {
        let err = run::<Iota>("client_infinite_query", vec![json!("getObject")]).unwrap_err();
        assert!(err.to_string().contains("not a paginated method"));
        let err = run::<Iota>("client_infinite_query", vec![json!("getCoins"), json!({})]).unwrap_err();
        assert!(err.to_string().contains("'params' must be an array"));
        let err = run::<Iota>(
            "client_infinite_query",
            vec![json!("getCoins"), json!(["0xa"]), json!({ "maxPages": 0 })],
        )
        .unwrap_err();
        assert!(err.to_string().contains("maxPages"));

        let (query, _) = infinite_request::<Iota>(&[
            json!("iotax_getOwnedObjects"),
            json!(["0xa"]),
            json!({ "limit": 10, "maxPages": 3 }),
        ])
        .unwrap();
        assert_eq!(query.cursor_index, 2);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.max_pages, 3);
        assert_eq!(query.cursor, Value::Null);
    }

    /// Serves canned pages and records the params it was called with.
    struct PagedRpc {
        rpc: unimove_transport::JsonRpcClient,
        pages: parking_lot::Mutex<Vec<Value>>,
        calls: parking_lot::Mutex<Vec<Value>>,
    }

    impl PagedRpc {
        fn new(pages: Vec<Value>) -> Self {
            let transport = Arc::new(unimove_transport::HttpTransport::new("http://127.0.0.1:9"));
            Self {
                rpc: unimove_transport::JsonRpcClient::new(transport, "sui"),
                pages: parking_lot::Mutex::new(pages),
                calls: parking_lot::Mutex::new(Vec::new()),
            }
        }
    }

    impl RpcClient for PagedRpc {
        fn rpc(&self) -> &unimove_transport::JsonRpcClient {
            &self.rpc
        }

        fn query(
            &self,
            _method: &str,
            params: Value,
        ) -> Result<Value, unimove_transport::TransportError> {
            self.calls.lock().push(params);
            Ok(self.pages.lock().remove(0))
        }
    }

    #[test]
    fn test_infinite_query_follows_cursors() {
        let rpc = PagedRpc::new(vec![
            json!({ "data": [1, 2], "nextCursor": "c1", "hasNextPage": true }),
            json!({ "data": [3], "nextCursor": "c2", "hasNextPage": true }),
            json!({ "data": [4], "nextCursor": null, "hasNextPage": false }),
        ]);
        let query = InfiniteQuery {
            method: "getAllCoins".to_string(),
            params: vec![json!("0xa")],
            cursor_index: 1,
            cursor: Value::Null,
            limit: Some(2),
            max_pages: 2,
        };
        let result = query.clone().run(&rpc).unwrap();
        assert_eq!(result["pages"].as_array().unwrap().len(), 2);
        assert_eq!(result["pageParams"], json!([null, "c1"]));
        assert_eq!(result["hasNextPage"], true);
        assert_eq!(result["nextCursor"], "c2");
        assert_eq!(rpc.calls.lock()[1], json!(["0xa", "c1", 2]));

        // Stops at the last page even with budget left.
        let rest = InfiniteQuery {
            cursor: json!("c2"),
            max_pages: 5,
            ..query
        }
        .run(&rpc)
        .unwrap();
        assert_eq!(rest["pages"].as_array().unwrap().len(), 1);
        assert_eq!(rest["hasNextPage"], false);
        assert_eq!(rest["nextCursor"], Value::Null);
    }

    #[test]
    fn test_infinite_query_rejects_non_page() {
        let rpc = PagedRpc::new(vec![json!({ "data": [] })]);
        let query = InfiniteQuery {
            method: "getAllCoins".to_string(),
            params: vec![json!("0xa")],
            cursor_index: 1,
            cursor: Value::Null,
            limit: None,
            max_pages: 1,
        };
        assert!(matches!(query.run(&rpc), Err(UnimoveError::Unavailable(_))));
    }

    #[test]
    fn test_sign_and_execute_builds_execute_params() {
        let generated = run::<Sui>("generate_keypair", vec![]).unwrap();
        let (params, url) = execute_request::<Sui>(&[
            json!("AAAA"),
            generated["secretKey"].clone(),
            json!("testnet"),
        ])
        .unwrap();
        assert_eq!(url, "https://fullnode.testnet.sui.io:443");
        assert_eq!(params[0], "AAAA");
        assert_eq!(params[1].as_array().unwrap().len(), 1);
        assert_eq!(params[2], json!({ "showEffects": true }));

        let err = run::<Sui>(
            "sign_and_execute_transaction",
            vec![json!("AAAA"), generated["secretKey"].clone(), json!("mainnet"), json!(7)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("'options' must be an object"));
    }

    #[test]
    fn test_current_wallet_and_wallets_shape() {
        let wallet = run::<Iota>("current_wallet", vec![]).unwrap();
        assert!(wallet["connectionStatus"] == "connected" || wallet["connectionStatus"] == "disconnected");
        let listed = run::<Iota>("wallets", vec![]).unwrap();
        assert_eq!(listed[0]["name"], "Unimove IOTA Wallet");
        assert_eq!(listed[0]["chain"], "iota");
    }

    #[test]
    fn test_decode_jwt_rejects_garbage() {
        let err = block_on(decode_jwt(vec![json!("a.b")])).unwrap_err();
        assert!(matches!(err, UnimoveError::Crypto(_)));
    }
}
