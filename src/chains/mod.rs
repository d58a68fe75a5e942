//! Chain backends and the type-level table that ties them together.
//!
//! Each chain is a marker type ([`Sui`], [`Iota`]) implementing [`Chain`].
//! The trait's associated types name that chain's raw modules; the module
//! traits below ([`ClientNamespace`], [`UtilsNamespace`], ...) give those
//! modules a shared member surface, so generic code written against
//! `C: Chain` gets the precise per-chain type without a runtime union.
//!
//! Members a chain does not have are typed as [`Absent`] rather than left
//! out, so every chain exposes the same set of member names.
//!
//! [`visit_chain`] is the one place a runtime [`ChainId`] is turned back
//! into a chain type.

use std::any::Any;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use unimove_crypto::{CryptoResult, Keypair, MultiSigPublicKey, PublicKey, SignedMessage};
use unimove_transport::{FaucetError, Network};
use unimove_types::{ChainId, ParsedKeypair, SignatureScheme, StructTag, StructTagError};

use crate::dispatch::Operation;
use crate::sdk::{AnySdk, NormalizedSdk};

pub mod client;
pub mod iota;
pub mod shared;
pub mod sui;
pub mod transaction;

pub use client::{ChainClient, RpcClient};
pub use iota::Iota;
pub use shared::{
    BcsModule, KeypairModule, MultisigModule, PasskeyModule, TransactionsModule, VerifyModule,
};
pub use sui::Sui;
pub use transaction::Transaction;

/// Marker for a member the chain does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Absent;

/// Shared instance, so absent members can be handed out by reference.
pub static ABSENT: Absent = Absent;

/// A module slot that may hold [`Absent`].
pub trait OptionalModule: Send + Sync + 'static {
    const PRESENT: bool;
}

impl OptionalModule for Absent {
    const PRESENT: bool = false;
}

pub trait ClientNamespace: Send + Sync + 'static {
    type Client: RpcClient;
    type Transport: 'static;
    type TransportError: std::error::Error + 'static;
    /// Error object carried by a failed JSON-RPC response.
    type JsonRpcError: std::error::Error + 'static;
    /// Network discovery tools, or [`Absent`].
    type NetworkTools: OptionalModule;

    fn create_client(&self, url: &str) -> Self::Client;
    fn get_fullnode_url(&self, network: Network) -> &'static str;
    /// Whether `value` is this chain's client type.
    fn is_client(&self, value: &dyn Any) -> bool;
    fn network_tools(&self) -> &Self::NetworkTools;
}

pub trait BcsNamespace: Send + Sync + 'static {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, bcs::Error>;
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, bcs::Error>;
    fn to_base64(&self, bytes: &[u8]) -> String;
}

pub trait TransactionsNamespace: Send + Sync + 'static {
    type Transaction: Send + 'static;

    fn transaction(&self) -> Self::Transaction;
}

pub trait UtilsNamespace: Send + Sync + 'static {
    /// Fully-qualified type of the native gas coin.
    fn native_coin_type(&self) -> &'static str;
    fn parse_struct_tag(&self, input: &str) -> Result<StructTag, StructTagError>;
    fn normalize_struct_tag(&self, tag: &StructTag) -> StructTag;
    fn normalize_address(&self, address: &str) -> String;
    fn is_valid_address(&self, address: &str) -> bool;
}

pub trait VerifyNamespace: Send + Sync + 'static {
    fn verify_personal_message_signature(
        &self,
        message: &[u8],
        signature: &str,
        address: Option<&str>,
    ) -> CryptoResult<PublicKey>;
    fn public_key_from_raw_bytes(
        &self,
        scheme: SignatureScheme,
        bytes: &[u8],
    ) -> CryptoResult<PublicKey>;
}

pub trait CryptographyNamespace: Send + Sync + 'static {
    /// Bech32 human readable part of exported private keys.
    fn private_key_prefix(&self) -> &'static str;
    fn decode_private_key(&self, value: &str) -> CryptoResult<ParsedKeypair>;
    fn encode_private_key(&self, scheme: SignatureScheme, secret: &[u8]) -> CryptoResult<String>;
}

pub trait MultisigNamespace: Send + Sync + 'static {
    fn from_public_keys(
        &self,
        members: Vec<(PublicKey, u8)>,
        threshold: u16,
    ) -> CryptoResult<MultiSigPublicKey>;
}

pub trait FaucetNamespace: Send + Sync + 'static {
    fn get_faucet_host(&self, network: Network) -> Option<&'static str>;
    fn request_from_faucet(&self, host: &str, recipient: &str) -> Result<Value, FaucetError>;
}

/// Keypair families that can sign.
pub trait KeypairNamespace: Send + Sync + 'static {
    fn scheme(&self) -> SignatureScheme;
    fn generate(&self) -> CryptoResult<Keypair>;
    fn from_secret_key(&self, secret: &[u8]) -> CryptoResult<Keypair>;
    /// Restore from the chain's Bech32 private key text.
    fn from_exported(&self, value: &str) -> CryptoResult<Keypair>;
    /// Export in the chain's Bech32 private key text.
    fn export_secret_key(&self, keypair: &Keypair) -> CryptoResult<String>;
    fn sign_personal_message(&self, keypair: &Keypair, message: &[u8])
        -> CryptoResult<SignedMessage>;
}

/// Keypair modules by algorithm.
pub struct KeypairModules<C> {
    pub ed25519: KeypairModule<C>,
    pub secp256k1: KeypairModule<C>,
    pub secp256r1: KeypairModule<C>,
    pub passkey: PasskeyModule<C>,
}

impl<C> KeypairModules<C> {
    pub const fn new() -> Self {
        Self {
            ed25519: KeypairModule::new(SignatureScheme::Ed25519),
            secp256k1: KeypairModule::new(SignatureScheme::Secp256k1),
            secp256r1: KeypairModule::new(SignatureScheme::Secp256r1),
            passkey: PasskeyModule::new(),
        }
    }
}

/// One chain's raw module set.
pub struct ChainModules<C: Chain> {
    pub client: C::Client,
    pub bcs: C::Bcs,
    pub transactions: C::Transactions,
    pub utils: C::Utils,
    pub verify: C::Verify,
    pub cryptography: C::Cryptography,
    pub multisig: C::Multisig,
    pub faucet: C::Faucet,
    pub zklogin: C::Zklogin,
    pub keypairs: KeypairModules<C>,
}

/// A supported chain, as a type.
pub trait Chain: Sized + Send + Sync + 'static {
    const ID: ChainId;

    type Client: ClientNamespace;
    type Bcs: BcsNamespace;
    type Transactions: TransactionsNamespace;
    type Utils: UtilsNamespace;
    type Verify: VerifyNamespace;
    type Cryptography: CryptographyNamespace;
    type Multisig: MultisigNamespace;
    type Faucet: FaucetNamespace;
    /// zkLogin helpers, or [`Absent`].
    type Zklogin: OptionalModule;

    fn modules() -> &'static ChainModules<Self>;

    /// Whether the backend is compiled in.
    fn available() -> bool;

    /// Operations only this chain offers.
    fn extra_operations() -> Vec<(&'static str, Operation)> {
        Vec::new()
    }

    fn wrap_sdk(sdk: Arc<NormalizedSdk<Self>>) -> AnySdk;
    fn unwrap_sdk(sdk: &AnySdk) -> Option<Arc<NormalizedSdk<Self>>>;
}

/// Generic code to run once the chain type is known.
pub trait ChainVisitor {
    type Output;

    fn visit<C: Chain>(self) -> Self::Output;
}

/// Run `visitor` with the chain type named by `chain`.
pub fn visit_chain<V: ChainVisitor>(chain: ChainId, visitor: V) -> V::Output {
    match chain {
        ChainId::Sui => visitor.visit::<Sui>(),
        ChainId::Iota => visitor.visit::<Iota>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdOf;

    impl ChainVisitor for IdOf {
        type Output = ChainId;

        fn visit<C: Chain>(self) -> ChainId {
            C::ID
        }
    }

    #[test]
    fn test_visit_chain_matches_id() {
        for chain in ChainId::ALL {
            assert_eq!(visit_chain(chain, IdOf), chain);
        }
    }

    #[test]
    fn test_zklogin_presence_per_chain() {
        assert!(<<Sui as Chain>::Zklogin as OptionalModule>::PRESENT);
        assert!(!<<Iota as Chain>::Zklogin as OptionalModule>::PRESENT);
        assert!(!<<<Sui as Chain>::Client as ClientNamespace>::NetworkTools as OptionalModule>::PRESENT);
        assert!(<<<Iota as Chain>::Client as ClientNamespace>::NetworkTools as OptionalModule>::PRESENT);
    }
}
