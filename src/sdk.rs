//! The normalized SDK surface.
//!
//! [`NormalizedSdk<C>`] exposes every chain's modules under the same member
//! names. Chain-specific constructors (`sui_client`, `decode_iota_private_key`,
//! ...) are reachable through the canonical names, and members a chain lacks
//! are typed [`Absent`](crate::chains::Absent) instead of being left out.
//!
//! ```ignore
//! let sdk = unimove::get_sdk::<Iota>().await?;
//! let client = sdk.create_client_for_network(Network::Testnet);
//! let tools = sdk.client.network; // &IotaNetworkTools
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use unimove_crypto::{CryptoResult, Keypair};
use unimove_transport::Network;
use unimove_types::{ChainId, ParsedKeypair, StructTag, StructTagError};

use crate::chains::{
    BcsNamespace, Chain, ChainModules, ClientNamespace, CryptographyNamespace, Iota,
    KeypairModules, KeypairNamespace, OptionalModule, Sui, TransactionsNamespace, UtilsNamespace,
};
use crate::error::InvalidPrivateKeyError;
use crate::registry::{registry, Capability};

/// The client type of chain `C`.
pub type Client<C> = <<C as Chain>::Client as ClientNamespace>::Client;
pub type ClientTransport<C> = <<C as Chain>::Client as ClientNamespace>::Transport;
pub type ClientTransportError<C> = <<C as Chain>::Client as ClientNamespace>::TransportError;
pub type ClientJsonRpcError<C> = <<C as Chain>::Client as ClientNamespace>::JsonRpcError;
pub type NetworkTools<C> = <<C as Chain>::Client as ClientNamespace>::NetworkTools;
/// The transaction builder type of chain `C`.
pub type TransactionOf<C> = <<C as Chain>::Transactions as TransactionsNamespace>::Transaction;

/// Member names of every [`NormalizedSdk`], in declaration order.
pub const SDK_MEMBERS: [&str; 15] = [
    "client",
    "client.network",
    "bcs",
    "transactions",
    "utils",
    "verify",
    "cryptography",
    "multisig",
    "faucet",
    "zklogin",
    "keypairs",
    "keypairs.ed25519",
    "keypairs.secp256k1",
    "keypairs.secp256r1",
    "keypairs.passkey",
];

/// The `client` member: constructor, URL lookup, type guard and optional
/// network discovery.
pub struct NormalizedClient<C: Chain> {
    module: &'static C::Client,
    /// Network discovery tools, or `Absent`.
    pub network: &'static NetworkTools<C>,
}

impl<C: Chain> NormalizedClient<C> {
    pub fn create(&self, url: &str) -> Client<C> {
        self.module.create_client(url)
    }

    pub fn get_fullnode_url(&self, network: Network) -> &'static str {
        self.module.get_fullnode_url(network)
    }

    pub fn is_client(&self, value: &dyn Any) -> bool {
        self.module.is_client(value)
    }

    /// The chain's own client module.
    pub fn raw(&self) -> &'static C::Client {
        self.module
    }
}

/// One chain's modules under chain-agnostic names.
pub struct NormalizedSdk<C: Chain> {
    pub chain: ChainId,
    pub client: NormalizedClient<C>,
    pub bcs: &'static C::Bcs,
    pub transactions: &'static C::Transactions,
    pub utils: &'static C::Utils,
    pub verify: &'static C::Verify,
    pub cryptography: &'static C::Cryptography,
    pub multisig: &'static C::Multisig,
    pub faucet: &'static C::Faucet,
    /// zkLogin helpers, or `Absent`.
    pub zklogin: &'static C::Zklogin,
    pub keypairs: &'static KeypairModules<C>,
}

impl<C: Chain> NormalizedSdk<C> {
    pub fn new() -> Self {
        Self::from_modules(C::modules())
    }

    pub fn from_modules(modules: &'static ChainModules<C>) -> Self {
        Self {
            chain: C::ID,
            client: NormalizedClient {
                module: &modules.client,
                network: modules.client.network_tools(),
            },
            bcs: &modules.bcs,
            transactions: &modules.transactions,
            utils: &modules.utils,
            verify: &modules.verify,
            cryptography: &modules.cryptography,
            multisig: &modules.multisig,
            faucet: &modules.faucet,
            zklogin: &modules.zklogin,
            keypairs: &modules.keypairs,
        }
    }

    pub fn create_client(&self, url: &str) -> Client<C> {
        self.client.create(url)
    }

    pub fn create_client_for_network(&self, network: Network) -> Client<C> {
        self.client.create(self.client.get_fullnode_url(network))
    }

    pub fn get_fullnode_url(&self, network: Network) -> &'static str {
        self.client.get_fullnode_url(network)
    }

    pub fn create_transaction(&self) -> TransactionOf<C> {
        self.transactions.transaction()
    }

    pub fn create_ed25519_keypair(&self) -> CryptoResult<Keypair> {
        self.keypairs.ed25519.generate()
    }

    pub fn create_secp256k1_keypair(&self) -> CryptoResult<Keypair> {
        self.keypairs.secp256k1.generate()
    }

    pub fn create_secp256r1_keypair(&self) -> CryptoResult<Keypair> {
        self.keypairs.secp256r1.generate()
    }

    /// Decode the chain's Bech32 private key text.
    pub fn decode_private_key(&self, value: &str) -> Result<ParsedKeypair, InvalidPrivateKeyError> {
        self.cryptography
            .decode_private_key(value)
            .map_err(|e| InvalidPrivateKeyError {
                chain: C::ID,
                message: e.to_string(),
            })
    }

    pub fn parse_struct_tag(&self, input: &str) -> Result<StructTag, StructTagError> {
        self.utils.parse_struct_tag(input)
    }

    pub fn normalize_struct_tag(&self, tag: &StructTag) -> StructTag {
        self.utils.normalize_struct_tag(tag)
    }

    pub fn bcs_serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, bcs::Error> {
        self.bcs.serialize(value)
    }

    /// Un-normalized access by capability path (`"client"`,
    /// `"keypairs.ed25519"`, ...).
    pub fn get_module(&self, name: &str) -> Capability {
        registry().lookup(C::ID, name)
    }

    /// Member name to presence.
    pub fn describe(&self) -> BTreeMap<&'static str, bool> {
        SDK_MEMBERS
            .into_iter()
            .map(|member| {
                let present = match member {
                    "client.network" => <NetworkTools<C> as OptionalModule>::PRESENT,
                    "zklogin" => <C::Zklogin as OptionalModule>::PRESENT,
                    _ => true,
                };
                (member, present)
            })
            .collect()
    }
}

impl<C: Chain> Default for NormalizedSdk<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Chain> fmt::Debug for NormalizedSdk<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedSdk")
            .field("chain", &self.chain)
            .field("members", &self.describe())
            .finish()
    }
}

/// A loaded SDK whose chain is known only at runtime.
#[derive(Clone)]
pub enum AnySdk {
    Sui(Arc<NormalizedSdk<Sui>>),
    Iota(Arc<NormalizedSdk<Iota>>),
}

macro_rules! with_sdk {
    ($any:expr, $sdk:ident => $body:expr) => {
        match $any {
            AnySdk::Sui($sdk) => $body,
            AnySdk::Iota($sdk) => $body,
        }
    };
}

impl AnySdk {
    pub fn chain(&self) -> ChainId {
        with_sdk!(self, sdk => sdk.chain)
    }

    /// The typed SDK, if this is chain `C`'s.
    pub fn downcast<C: Chain>(&self) -> Option<Arc<NormalizedSdk<C>>> {
        C::unwrap_sdk(self)
    }

    pub fn describe(&self) -> BTreeMap<&'static str, bool> {
        with_sdk!(self, sdk => sdk.describe())
    }

    pub fn get_fullnode_url(&self, network: Network) -> &'static str {
        with_sdk!(self, sdk => sdk.get_fullnode_url(network))
    }

    pub fn decode_private_key(&self, value: &str) -> Result<ParsedKeypair, InvalidPrivateKeyError> {
        with_sdk!(self, sdk => sdk.decode_private_key(value))
    }

    pub fn parse_struct_tag(&self, input: &str) -> Result<StructTag, StructTagError> {
        with_sdk!(self, sdk => sdk.parse_struct_tag(input))
    }

    pub fn normalize_struct_tag(&self, tag: &StructTag) -> StructTag {
        with_sdk!(self, sdk => sdk.normalize_struct_tag(tag))
    }

    pub fn get_module(&self, name: &str) -> Capability {
        with_sdk!(self, sdk => sdk.get_module(name))
    }

    /// Whether both handles point at the same loaded SDK.
    pub fn ptr_eq(&self, other: &AnySdk) -> bool {
        match (self, other) {
            (AnySdk::Sui(a), AnySdk::Sui(b)) => Arc::ptr_eq(a, b),
            (AnySdk::Iota(a), AnySdk::Iota(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for AnySdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_sdk!(self, sdk => sdk.fmt(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unimove_types::{SignatureScheme, TypeTag};

    #[test]
    fn test_member_names_match_across_chains() {
        let sui = NormalizedSdk::<Sui>::new().describe();
        let iota = NormalizedSdk::<Iota>::new().describe();
        assert!(sui.keys().eq(iota.keys()));
        assert!(sui["zklogin"]);
        assert!(!iota["zklogin"]);
        assert!(!sui["client.network"]);
        assert!(iota["client.network"]);
    }

    #[test]
    fn test_decode_private_key_wraps_failure() {
        let sdk = NormalizedSdk::<Sui>::new();
        let bad = "suiprivkey1garbage";
        let err = sdk.decode_private_key(bad).unwrap_err();
        let raw = Sui::modules()
            .cryptography
            .decode_private_key(bad)
            .unwrap_err();
        assert_eq!(err.chain, ChainId::Sui);
        assert_eq!(err.message, raw.to_string());
        assert_eq!(
            err.to_string(),
            format!("Invalid private key for Sui: {}", raw)
        );
    }

    #[test]
    fn test_decode_private_key_accepts_own_prefix_only() {
        let sui = NormalizedSdk::<Sui>::new();
        let iota = NormalizedSdk::<Iota>::new();
        let kp = sui.create_secp256r1_keypair().unwrap();
        let text = sui.keypairs.secp256r1.export_secret_key(&kp).unwrap();
        let parsed = sui.decode_private_key(&text).unwrap();
        assert_eq!(parsed.schema, SignatureScheme::Secp256r1);
        assert!(iota.decode_private_key(&text).is_err());
    }

    #[test]
    fn test_struct_tag_pass_through() {
        let sdk = NormalizedSdk::<Iota>::new();
        let tag = sdk.parse_struct_tag("0x2::coin::Coin<0x2::iota::IOTA>").unwrap();
        let normalized = sdk.normalize_struct_tag(&tag);
        assert_eq!(normalized.address, "0x2");
        assert_eq!(normalized.module, "coin");
        assert_eq!(normalized.name, "Coin");
        assert_eq!(normalized.type_params.len(), 1);
        match &normalized.type_params[0] {
            TypeTag::Struct(inner) => {
                assert_eq!(inner.address, "0x2");
                assert_eq!(inner.module, "iota");
                assert_eq!(inner.name, "IOTA");
                assert!(inner.type_params.is_empty());
            }
            other => panic!("expected struct type parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_any_sdk_downcast() {
        let any = Sui::wrap_sdk(Arc::new(NormalizedSdk::<Sui>::new()));
        assert_eq!(any.chain(), ChainId::Sui);
        assert!(any.downcast::<Sui>().is_some());
        assert!(any.downcast::<Iota>().is_none());
        assert!(any.ptr_eq(&any.clone()));
    }

    #[test]
    fn test_bcs_serialize_alias() {
        let sdk = NormalizedSdk::<Sui>::new();
        assert_eq!(sdk.bcs_serialize(&7u64).unwrap(), 7u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_json_rpc_error_alias() {
        fn from_transport<C: Chain>(err: &ClientTransportError<C>) -> Option<ClientJsonRpcError<C>>
        where
            C::Client: ClientNamespace<
                TransportError = unimove_transport::TransportError,
                JsonRpcError = unimove_transport::JsonRpcError,
            >,
        {
            err.as_json_rpc()
        }

        let err = unimove_transport::TransportError::Rpc {
            code: -32000,
            message: "object not found".into(),
            data: None,
        };
        let sui = from_transport::<Sui>(&err).unwrap();
        let iota = from_transport::<Iota>(&err).unwrap();
        assert_eq!(sui, iota);
        assert_eq!(sui.code, -32000);
    }

    #[test]
    fn test_client_for_network() {
        let sdk = NormalizedSdk::<Iota>::new();
        let client = sdk.create_client_for_network(Network::Devnet);
        assert!(sdk.client.is_client(&client));
    }
}
