//! Modules whose behavior is identical on both chains.
//!
//! The signing modules are still parameterized by chain: exported keys use
//! the chain's Bech32 prefix, and transactions are typed per chain.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use unimove_crypto::passkey::{parse_passkey_public_key, passkey_public_key_from_base64};
use unimove_crypto::{
    sign_personal_message, verify_personal_message_signature, CryptoResult, Keypair,
    MultiSigPublicKey, PublicKey, SignedMessage,
};
use unimove_types::encoding::base64_encode;
use unimove_types::SignatureScheme;

use super::{
    BcsNamespace, Chain, CryptographyNamespace, KeypairNamespace, MultisigNamespace,
    TransactionsNamespace, Transaction, VerifyNamespace,
};

/// BCS entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcsModule;

impl BcsNamespace for BcsModule {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(value)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, bcs::Error> {
        bcs::from_bytes(bytes)
    }

    fn to_base64(&self, bytes: &[u8]) -> String {
        base64_encode(bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyModule;

impl VerifyNamespace for VerifyModule {
    fn verify_personal_message_signature(
        &self,
        message: &[u8],
        signature: &str,
        address: Option<&str>,
    ) -> CryptoResult<PublicKey> {
        verify_personal_message_signature(message, signature, address)
    }

    fn public_key_from_raw_bytes(
        &self,
        scheme: SignatureScheme,
        bytes: &[u8],
    ) -> CryptoResult<PublicKey> {
        PublicKey::from_raw(scheme, bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultisigModule;

impl MultisigNamespace for MultisigModule {
    fn from_public_keys(
        &self,
        members: Vec<(PublicKey, u8)>,
        threshold: u16,
    ) -> CryptoResult<MultiSigPublicKey> {
        MultiSigPublicKey::new(members, threshold)
    }
}

/// Transaction builder entry point.
pub struct TransactionsModule<C>(PhantomData<fn() -> C>);

impl<C> TransactionsModule<C> {
    pub const fn new() -> Self {
        TransactionsModule(PhantomData)
    }
}

impl<C: Chain> TransactionsNamespace for TransactionsModule<C> {
    type Transaction = Transaction<C>;

    fn transaction(&self) -> Transaction<C> {
        Transaction::new()
    }
}

impl<C: Chain> fmt::Debug for TransactionsModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionsModule<{}>", C::ID)
    }
}

/// One signing algorithm on one chain.
pub struct KeypairModule<C> {
    scheme: SignatureScheme,
    _chain: PhantomData<fn() -> C>,
}

impl<C> KeypairModule<C> {
    pub const fn new(scheme: SignatureScheme) -> Self {
        Self {
            scheme,
            _chain: PhantomData,
        }
    }
}

impl<C: Chain> KeypairNamespace for KeypairModule<C> {
    fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    fn generate(&self) -> CryptoResult<Keypair> {
        Keypair::generate(self.scheme)
    }

    fn from_secret_key(&self, secret: &[u8]) -> CryptoResult<Keypair> {
        Keypair::from_secret_key(self.scheme, secret)
    }

    fn from_exported(&self, value: &str) -> CryptoResult<Keypair> {
        let parsed = C::modules().cryptography.decode_private_key(value)?;
        if parsed.schema != self.scheme {
            return Err(unimove_crypto::CryptoError::InvalidKey(format!(
                "expected a {} key, got {}",
                self.scheme, parsed.schema
            )));
        }
        Keypair::from_parsed(&parsed)
    }

    fn export_secret_key(&self, keypair: &Keypair) -> CryptoResult<String> {
        C::modules()
            .cryptography
            .encode_private_key(keypair.scheme(), keypair.secret_key())
    }

    fn sign_personal_message(
        &self,
        keypair: &Keypair,
        message: &[u8],
    ) -> CryptoResult<SignedMessage> {
        sign_personal_message(keypair, message)
    }
}

impl<C: Chain> fmt::Debug for KeypairModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeypairModule<{}>({})", C::ID, self.scheme)
    }
}

/// Passkey public keys. Passkeys sign inside an authenticator, so there is
/// no secret key side.
pub struct PasskeyModule<C>(PhantomData<fn() -> C>);

impl<C> PasskeyModule<C> {
    pub const fn new() -> Self {
        PasskeyModule(PhantomData)
    }

    pub fn public_key_from_bytes(&self, bytes: &[u8]) -> CryptoResult<PublicKey> {
        parse_passkey_public_key(bytes)
    }

    pub fn public_key_from_base64(&self, b64: &str) -> CryptoResult<PublicKey> {
        passkey_public_key_from_base64(b64)
    }

    pub fn to_address(&self, public_key: &PublicKey) -> String {
        public_key.to_address()
    }
}

impl<C: Chain> fmt::Debug for PasskeyModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasskeyModule<{}>", C::ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{Iota, Sui};

    #[test]
    fn test_export_uses_chain_prefix() {
        let sui = KeypairModule::<Sui>::new(SignatureScheme::Ed25519);
        let iota = KeypairModule::<Iota>::new(SignatureScheme::Ed25519);
        let kp = sui.from_secret_key(&[6u8; 32]).unwrap();
        let sui_text = sui.export_secret_key(&kp).unwrap();
        let iota_text = iota.export_secret_key(&kp).unwrap();
        assert!(sui_text.starts_with("suiprivkey"));
        assert!(iota_text.starts_with("iotaprivkey"));
        assert_eq!(iota.from_exported(&iota_text).unwrap().to_address(), kp.to_address());
        assert!(iota.from_exported(&sui_text).is_err());
    }

    #[test]
    fn test_from_exported_checks_scheme() {
        let ed = KeypairModule::<Sui>::new(SignatureScheme::Ed25519);
        let k1 = KeypairModule::<Sui>::new(SignatureScheme::Secp256k1);
        let kp = k1.generate().unwrap();
        let text = k1.export_secret_key(&kp).unwrap();
        assert!(ed.from_exported(&text).is_err());
    }

    #[test]
    fn test_bcs_module_round_trip() {
        let bytes = BcsModule.serialize(&vec![1u8, 2, 3]).unwrap();
        assert_eq!(bytes, vec![3, 1, 2, 3]);
        let back: Vec<u8> = BcsModule.deserialize(&bytes).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
