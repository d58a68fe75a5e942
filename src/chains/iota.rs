//! IOTA backend.
//!
//! Mirrors the Sui backend, plus a network discovery namespace hung off the
//! client module. IOTA has no zkLogin.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use unimove_crypto::{decode_private_key, encode_private_key, CryptoResult};
use unimove_crypto::IOTA_PRIVATE_KEY_PREFIX;
use unimove_transport::faucet::IOTA_FAUCET_PATH;
use unimove_transport::{
    faucet_host, fullnode_url, iota_networks, request_from_faucet, FaucetError, HttpTransport,
    JsonRpcError, Network, NetworkConfiguration, TransportError, IOTA_APPS_BACKEND,
};
use unimove_types::address::{is_valid_address, normalize_address};
use unimove_types::{ChainId, ParsedKeypair, SignatureScheme, StructTag, StructTagError};

use super::{
    Absent, BcsModule, Chain, ChainClient, ChainModules, ClientNamespace, CryptographyNamespace,
    FaucetNamespace, KeypairModules, MultisigModule, OptionalModule, TransactionsModule,
    UtilsNamespace, VerifyModule,
};
use crate::config::config;
use crate::dispatch::Operation;
use crate::operations;
use crate::sdk::{AnySdk, NormalizedSdk};

/// The IOTA chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Iota;

/// JSON-RPC namespace (`iota_`, `iotax_`).
pub const IOTA_RPC_NAMESPACE: &str = "iota";

pub const IOTA_TYPE_ARG: &str = "0x2::iota::IOTA";

pub type IotaClient = ChainClient<Iota>;
pub type IotaHttpTransport = HttpTransport;
pub type IotaHttpTransportError = TransportError;
pub type IotaJsonRpcError = JsonRpcError;

/// Network discovery: the published table of IOTA networks and services.
#[derive(Debug, Clone, Copy, Default)]
pub struct IotaNetworkTools;

impl IotaNetworkTools {
    pub fn get_all_networks(&self) -> &'static [NetworkConfiguration] {
        iota_networks()
    }

    pub fn get_default_network(&self) -> Network {
        Network::Mainnet
    }

    pub fn get_network(&self, network: Network) -> Option<&'static NetworkConfiguration> {
        iota_networks().iter().find(|n| n.id == network)
    }

    pub fn get_graphql_url(&self, network: Network) -> Option<&'static str> {
        self.get_network(network).and_then(|n| n.graphql)
    }

    pub fn get_apps_backend(&self) -> &'static str {
        IOTA_APPS_BACKEND
    }
}

impl OptionalModule for IotaNetworkTools {
    const PRESENT: bool = true;
}

static NETWORK_TOOLS: IotaNetworkTools = IotaNetworkTools;

#[derive(Debug, Clone, Copy, Default)]
pub struct IotaClientModule;

impl IotaClientModule {
    pub fn iota_client(&self, url: &str) -> IotaClient {
        ChainClient::connect_with(url, IOTA_RPC_NAMESPACE, config().transport)
    }

    pub fn is_iota_client(&self, value: &dyn Any) -> bool {
        value.is::<IotaClient>()
    }
}

impl ClientNamespace for IotaClientModule {
    type Client = IotaClient;
    type Transport = IotaHttpTransport;
    type TransportError = IotaHttpTransportError;
    type JsonRpcError = IotaJsonRpcError;
    type NetworkTools = IotaNetworkTools;

    fn create_client(&self, url: &str) -> IotaClient {
        self.iota_client(url)
    }

    fn get_fullnode_url(&self, network: Network) -> &'static str {
        fullnode_url(ChainId::Iota, network)
    }

    fn is_client(&self, value: &dyn Any) -> bool {
        self.is_iota_client(value)
    }

    fn network_tools(&self) -> &IotaNetworkTools {
        &NETWORK_TOOLS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IotaUtilsModule;

impl IotaUtilsModule {
    pub fn normalize_iota_address(&self, address: &str) -> String {
        normalize_address(address)
    }

    pub fn is_valid_iota_address(&self, address: &str) -> bool {
        is_valid_address(address)
    }
}

impl UtilsNamespace for IotaUtilsModule {
    fn native_coin_type(&self) -> &'static str {
        IOTA_TYPE_ARG
    }

    fn parse_struct_tag(&self, input: &str) -> Result<StructTag, StructTagError> {
        unimove_types::parse_struct_tag(input)
    }

    fn normalize_struct_tag(&self, tag: &StructTag) -> StructTag {
        unimove_types::normalize_struct_tag(tag)
    }

    fn normalize_address(&self, address: &str) -> String {
        self.normalize_iota_address(address)
    }

    fn is_valid_address(&self, address: &str) -> bool {
        self.is_valid_iota_address(address)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IotaCryptographyModule;

impl IotaCryptographyModule {
    pub fn decode_iota_private_key(&self, value: &str) -> CryptoResult<ParsedKeypair> {
        decode_private_key(IOTA_PRIVATE_KEY_PREFIX, value)
    }

    pub fn encode_iota_private_key(
        &self,
        scheme: SignatureScheme,
        secret: &[u8],
    ) -> CryptoResult<String> {
        encode_private_key(IOTA_PRIVATE_KEY_PREFIX, scheme, secret)
    }
}

impl CryptographyNamespace for IotaCryptographyModule {
    fn private_key_prefix(&self) -> &'static str {
        IOTA_PRIVATE_KEY_PREFIX
    }

    fn decode_private_key(&self, value: &str) -> CryptoResult<ParsedKeypair> {
        self.decode_iota_private_key(value)
    }

    fn encode_private_key(&self, scheme: SignatureScheme, secret: &[u8]) -> CryptoResult<String> {
        self.encode_iota_private_key(scheme, secret)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IotaFaucetModule;

impl IotaFaucetModule {
    pub fn request_iota_from_faucet(
        &self,
        host: &str,
        recipient: &str,
    ) -> Result<Value, FaucetError> {
        let transport = HttpTransport::with_options(host, config().transport);
        request_from_faucet(&transport, host, IOTA_FAUCET_PATH, recipient)
    }
}

impl FaucetNamespace for IotaFaucetModule {
    fn get_faucet_host(&self, network: Network) -> Option<&'static str> {
        faucet_host(ChainId::Iota, network)
    }

    fn request_from_faucet(&self, host: &str, recipient: &str) -> Result<Value, FaucetError> {
        self.request_iota_from_faucet(host, recipient)
    }
}

static MODULES: ChainModules<Iota> = ChainModules {
    client: IotaClientModule,
    bcs: BcsModule,
    transactions: TransactionsModule::new(),
    utils: IotaUtilsModule,
    verify: VerifyModule,
    cryptography: IotaCryptographyModule,
    multisig: MultisigModule,
    faucet: IotaFaucetModule,
    zklogin: Absent,
    keypairs: KeypairModules::new(),
};

impl Chain for Iota {
    const ID: ChainId = ChainId::Iota;

    type Client = IotaClientModule;
    type Bcs = BcsModule;
    type Transactions = TransactionsModule<Iota>;
    type Utils = IotaUtilsModule;
    type Verify = VerifyModule;
    type Cryptography = IotaCryptographyModule;
    type Multisig = MultisigModule;
    type Faucet = IotaFaucetModule;
    type Zklogin = Absent;

    fn modules() -> &'static ChainModules<Self> {
        &MODULES
    }

    fn available() -> bool {
        cfg!(feature = "iota")
    }

    fn extra_operations() -> Vec<(&'static str, Operation)> {
        vec![("get_network", operations::get_network as Operation)]
    }

    fn wrap_sdk(sdk: Arc<NormalizedSdk<Self>>) -> AnySdk {
        AnySdk::Iota(sdk)
    }

    fn unwrap_sdk(sdk: &AnySdk) -> Option<Arc<NormalizedSdk<Self>>> {
        match sdk {
            AnySdk::Iota(sdk) => Some(Arc::clone(sdk)),
            _ => None,
        }
    }
}
