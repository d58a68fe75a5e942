//! Network tables and fullnode transport for the unimove workspace.
//!
//! - [`network`]: per-chain fullnode/GraphQL/faucet endpoints and the IOTA
//!   network discovery table
//! - [`http`]: blocking JSON-RPC transport with retry and typed read methods
//! - [`faucet`]: test-network funding requests

pub mod faucet;
pub mod http;
pub mod network;

pub use faucet::{request_from_faucet, FaucetError};
pub use http::{
    Balance, Coin, CoinPage, HttpTransport, JsonRpcClient, JsonRpcError, TransportError,
    TransportOptions,
};
pub use network::{
    faucet_host, fullnode_url, graphql_url, infer_network_from_url, iota_networks, Network,
    NetworkConfiguration, UnknownNetwork, IOTA_APPS_BACKEND,
};
