//! Fullnode client typed by chain.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use unimove_transport::{
    Balance, CoinPage, HttpTransport, JsonRpcClient, TransportError, TransportOptions,
};

use super::Chain;

/// Access to the JSON-RPC layer under a chain client.
pub trait RpcClient: Send + Sync + 'static {
    fn rpc(&self) -> &JsonRpcClient;

    fn url(&self) -> &str {
        self.rpc().transport().url()
    }

    /// Call `method`, adding the chain's namespace prefix when the name has
    /// none (`getObject` becomes `sui_getObject`).
    fn query(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let rpc = self.rpc();
        if method.contains('_') {
            rpc.call(method, params)
        } else {
            rpc.call(&rpc.method_name(method, is_extended_method(method)), params)
        }
    }
}

/// Methods served under the extended (`suix_`/`iotax_`) namespace.
const EXTENDED_METHODS: &[&str] = &[
    "getAllBalances",
    "getAllCoins",
    "getBalance",
    "getCoinMetadata",
    "getCoins",
    "getDynamicFields",
    "getOwnedObjects",
    "getReferenceGasPrice",
    "getTotalSupply",
    "queryEvents",
    "queryTransactionBlocks",
    "resolveNameServiceAddress",
];

pub fn is_extended_method(method: &str) -> bool {
    EXTENDED_METHODS.contains(&method)
}

/// A fullnode client for chain `C`.
pub struct ChainClient<C> {
    rpc: JsonRpcClient,
    _chain: PhantomData<fn() -> C>,
}

impl<C: Chain> ChainClient<C> {
    pub fn connect(url: &str, namespace: &'static str) -> Self {
        Self::connect_with(url, namespace, TransportOptions::from_env())
    }

    pub fn connect_with(url: &str, namespace: &'static str, options: TransportOptions) -> Self {
        let transport = Arc::new(HttpTransport::with_options(url, options));
        Self {
            rpc: JsonRpcClient::new(transport, namespace),
            _chain: PhantomData,
        }
    }

    pub fn get_chain_identifier(&self) -> Result<String, TransportError> {
        self.rpc.get_chain_identifier()
    }

    pub fn get_reference_gas_price(&self) -> Result<u64, TransportError> {
        self.rpc.get_reference_gas_price()
    }

    pub fn get_latest_checkpoint_sequence_number(&self) -> Result<u64, TransportError> {
        self.rpc.get_latest_checkpoint_sequence_number()
    }

    pub fn get_balance(&self, owner: &str, coin_type: Option<&str>) -> Result<Balance, TransportError> {
        self.rpc.get_balance(owner, coin_type)
    }

    pub fn get_coins(
        &self,
        owner: &str,
        coin_type: Option<&str>,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<CoinPage, TransportError> {
        self.rpc.get_coins(owner, coin_type, cursor, limit)
    }

    pub fn get_object(&self, object_id: &str) -> Result<Value, TransportError> {
        self.rpc.get_object(object_id, true)
    }
}

impl<C: Chain> RpcClient for ChainClient<C> {
    fn rpc(&self) -> &JsonRpcClient {
        &self.rpc
    }
}

impl<C: Chain> fmt::Debug for ChainClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainClient")
            .field("chain", &C::ID)
            .field("url", &self.url())
            .finish()
    }
}
