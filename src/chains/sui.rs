//! Sui backend.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use unimove_crypto::zklogin::{self, DecodedJwt};
use unimove_crypto::{decode_private_key, encode_private_key, CryptoResult, PublicKey};
use unimove_crypto::SUI_PRIVATE_KEY_PREFIX;
use unimove_transport::faucet::SUI_FAUCET_PATH;
use unimove_transport::{
    faucet_host, fullnode_url, request_from_faucet, FaucetError, HttpTransport, JsonRpcError,
    Network, TransportError,
};
use unimove_types::address::{is_valid_address, normalize_address};
use unimove_types::{ChainId, ParsedKeypair, SignatureScheme, StructTag, StructTagError};

use super::{
    Absent, BcsModule, Chain, ChainClient, ChainModules, ClientNamespace, CryptographyNamespace,
    FaucetNamespace, KeypairModules, MultisigModule, OptionalModule, TransactionsModule,
    UtilsNamespace, VerifyModule, ABSENT,
};
use crate::config::config;
use crate::dispatch::Operation;
use crate::operations;
use crate::sdk::{AnySdk, NormalizedSdk};

/// The Sui chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sui;

/// JSON-RPC namespace (`sui_`, `suix_`).
pub const SUI_RPC_NAMESPACE: &str = "sui";

/// Native gas coin.
pub const SUI_TYPE_ARG: &str = "0x2::sui::SUI";

pub type SuiClient = ChainClient<Sui>;
pub type SuiHttpTransport = HttpTransport;
pub type SuiHttpTransportError = TransportError;
pub type SuiJsonRpcError = JsonRpcError;

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiClientModule;

impl SuiClientModule {
    pub fn sui_client(&self, url: &str) -> SuiClient {
        ChainClient::connect_with(url, SUI_RPC_NAMESPACE, config().transport)
    }

    pub fn is_sui_client(&self, value: &dyn Any) -> bool {
        value.is::<SuiClient>()
    }
}

impl ClientNamespace for SuiClientModule {
    type Client = SuiClient;
    type Transport = SuiHttpTransport;
    type TransportError = SuiHttpTransportError;
    type JsonRpcError = SuiJsonRpcError;
    type NetworkTools = Absent;

    fn create_client(&self, url: &str) -> SuiClient {
        self.sui_client(url)
    }

    fn get_fullnode_url(&self, network: Network) -> &'static str {
        fullnode_url(ChainId::Sui, network)
    }

    fn is_client(&self, value: &dyn Any) -> bool {
        self.is_sui_client(value)
    }

    fn network_tools(&self) -> &Absent {
        &ABSENT
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiUtilsModule;

impl SuiUtilsModule {
    pub fn normalize_sui_address(&self, address: &str) -> String {
        normalize_address(address)
    }

    pub fn is_valid_sui_address(&self, address: &str) -> bool {
        is_valid_address(address)
    }
}

impl UtilsNamespace for SuiUtilsModule {
    fn native_coin_type(&self) -> &'static str {
        SUI_TYPE_ARG
    }

    fn parse_struct_tag(&self, input: &str) -> Result<StructTag, StructTagError> {
        unimove_types::parse_struct_tag(input)
    }

    fn normalize_struct_tag(&self, tag: &StructTag) -> StructTag {
        unimove_types::normalize_struct_tag(tag)
    }

    fn normalize_address(&self, address: &str) -> String {
        self.normalize_sui_address(address)
    }

    fn is_valid_address(&self, address: &str) -> bool {
        self.is_valid_sui_address(address)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiCryptographyModule;

impl SuiCryptographyModule {
    pub fn decode_sui_private_key(&self, value: &str) -> CryptoResult<ParsedKeypair> {
        decode_private_key(SUI_PRIVATE_KEY_PREFIX, value)
    }

    pub fn encode_sui_private_key(
        &self,
        scheme: SignatureScheme,
        secret: &[u8],
    ) -> CryptoResult<String> {
        encode_private_key(SUI_PRIVATE_KEY_PREFIX, scheme, secret)
    }
}

impl CryptographyNamespace for SuiCryptographyModule {
    fn private_key_prefix(&self) -> &'static str {
        SUI_PRIVATE_KEY_PREFIX
    }

    fn decode_private_key(&self, value: &str) -> CryptoResult<ParsedKeypair> {
        self.decode_sui_private_key(value)
    }

    fn encode_private_key(&self, scheme: SignatureScheme, secret: &[u8]) -> CryptoResult<String> {
        self.encode_sui_private_key(scheme, secret)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiFaucetModule;

impl SuiFaucetModule {
    pub fn request_sui_from_faucet(&self, host: &str, recipient: &str) -> Result<Value, FaucetError> {
        let transport = HttpTransport::with_options(host, config().transport);
        request_from_faucet(&transport, host, SUI_FAUCET_PATH, recipient)
    }
}

impl FaucetNamespace for SuiFaucetModule {
    fn get_faucet_host(&self, network: Network) -> Option<&'static str> {
        faucet_host(ChainId::Sui, network)
    }

    fn request_from_faucet(&self, host: &str, recipient: &str) -> Result<Value, FaucetError> {
        self.request_sui_from_faucet(host, recipient)
    }
}

/// zkLogin helpers. IOTA has no zkLogin support.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZkLoginModule;

impl ZkLoginModule {
    pub fn decode_jwt(&self, jwt: &str) -> CryptoResult<DecodedJwt> {
        zklogin::decode_jwt(jwt)
    }

    pub fn get_extended_ephemeral_public_key(&self, public_key: &PublicKey) -> String {
        zklogin::get_extended_ephemeral_public_key(public_key)
    }

    pub fn generate_randomness(&self) -> String {
        zklogin::generate_randomness()
    }
}

impl OptionalModule for ZkLoginModule {
    const PRESENT: bool = true;
}

static MODULES: ChainModules<Sui> = ChainModules {
    client: SuiClientModule,
    bcs: BcsModule,
    transactions: TransactionsModule::new(),
    utils: SuiUtilsModule,
    verify: VerifyModule,
    cryptography: SuiCryptographyModule,
    multisig: MultisigModule,
    faucet: SuiFaucetModule,
    zklogin: ZkLoginModule,
    keypairs: KeypairModules::new(),
};

impl Chain for Sui {
    const ID: ChainId = ChainId::Sui;

    type Client = SuiClientModule;
    type Bcs = BcsModule;
    type Transactions = TransactionsModule<Sui>;
    type Utils = SuiUtilsModule;
    type Verify = VerifyModule;
    type Cryptography = SuiCryptographyModule;
    type Multisig = MultisigModule;
    type Faucet = SuiFaucetModule;
    type Zklogin = ZkLoginModule;

    fn modules() -> &'static ChainModules<Self> {
        &MODULES
    }

    fn available() -> bool {
        cfg!(feature = "sui")
    }

    fn extra_operations() -> Vec<(&'static str, Operation)> {
        vec![("decode_jwt", operations::decode_jwt as Operation)]
    }

    fn wrap_sdk(sdk: Arc<NormalizedSdk<Self>>) -> AnySdk {
        AnySdk::Sui(sdk)
    }

    fn unwrap_sdk(sdk: &AnySdk) -> Option<Arc<NormalizedSdk<Self>>> {
        match sdk {
            AnySdk::Sui(sdk) => Some(Arc::clone(sdk)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::RpcClient;

    #[test]
    fn test_client_guard() {
        let client = MODULES.client.sui_client("http://127.0.0.1:9000");
        assert!(MODULES.client.is_client(&client));
        assert!(!MODULES.client.is_client(&"not a client"));
        assert_eq!(client.url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_private_key_round_trip() {
        let text = MODULES
            .cryptography
            .encode_sui_private_key(SignatureScheme::Ed25519, &[1u8; 32])
            .unwrap();
        assert!(text.starts_with("suiprivkey1"));
        let parsed = MODULES.cryptography.decode_sui_private_key(&text).unwrap();
        assert_eq!(parsed.schema, SignatureScheme::Ed25519);
        assert_eq!(parsed.secret_key, [1u8; 32]);
    }

    #[test]
    fn test_fullnode_url() {
        assert_eq!(
            MODULES.client.get_fullnode_url(Network::Mainnet),
            "https://fullnode.mainnet.sui.io:443"
        );
        assert_eq!(MODULES.faucet.get_faucet_host(Network::Mainnet), None);
    }
}
