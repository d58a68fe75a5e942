//! Keypairs and public keys for the three secret-key schemes, plus the
//! passkey public key (secp256r1 under its own flag).
//!
//! Addresses on both chains are `Blake2b256(flag || public_key)`.

use std::fmt;

use fastcrypto::ed25519::{Ed25519KeyPair, Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use fastcrypto::hash::{Blake2b256, HashFunction};
use fastcrypto::secp256k1::{
    Secp256k1KeyPair, Secp256k1PrivateKey, Secp256k1PublicKey, Secp256k1Signature,
};
use fastcrypto::secp256r1::{
    Secp256r1KeyPair, Secp256r1PrivateKey, Secp256r1PublicKey, Secp256r1Signature,
};
use fastcrypto::traits::{KeyPair as _, Signer, ToFromBytes, VerifyingKey};
use rand::RngCore;
use tracing::trace;
use unimove_types::address::{address_from_digest, address_to_string};
use unimove_types::encoding::base64_encode;
use unimove_types::{ParsedKeypair, SignatureScheme};

use crate::error::{CryptoError, CryptoResult};

/// Raw signature length for every supported scheme.
pub const SIGNATURE_LENGTH: usize = 64;
pub const SECRET_KEY_LENGTH: usize = 32;

/// Derive an address from a scheme flag and raw public key bytes.
pub fn address_for(flag: u8, public_key: &[u8]) -> String {
    let mut input = Vec::with_capacity(1 + public_key.len());
    input.push(flag);
    input.extend_from_slice(public_key);
    address_to_string(&address_from_digest(Blake2b256::digest(&input).digest))
}

/// A public key tagged with its scheme.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519(Ed25519PublicKey),
    Secp256k1(Secp256k1PublicKey),
    Secp256r1(Secp256r1PublicKey),
    Passkey(Secp256r1PublicKey),
}

impl PublicKey {
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            PublicKey::Ed25519(_) => SignatureScheme::Ed25519,
            PublicKey::Secp256k1(_) => SignatureScheme::Secp256k1,
            PublicKey::Secp256r1(_) => SignatureScheme::Secp256r1,
            PublicKey::Passkey(_) => SignatureScheme::Passkey,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(pk) => pk.as_ref(),
            PublicKey::Secp256k1(pk) => pk.as_ref(),
            PublicKey::Secp256r1(pk) | PublicKey::Passkey(pk) => pk.as_ref(),
        }
    }

    /// Parse raw key bytes for `scheme`.
    pub fn from_raw(scheme: SignatureScheme, bytes: &[u8]) -> CryptoResult<Self> {
        let bad = |e: fastcrypto::error::FastCryptoError| {
            CryptoError::InvalidKey(format!("{} public key: {}", scheme, e))
        };
        Ok(match scheme {
            SignatureScheme::Ed25519 => {
                PublicKey::Ed25519(Ed25519PublicKey::from_bytes(bytes).map_err(bad)?)
            }
            SignatureScheme::Secp256k1 => {
                PublicKey::Secp256k1(Secp256k1PublicKey::from_bytes(bytes).map_err(bad)?)
            }
            SignatureScheme::Secp256r1 => {
                PublicKey::Secp256r1(Secp256r1PublicKey::from_bytes(bytes).map_err(bad)?)
            }
            SignatureScheme::Passkey => {
                PublicKey::Passkey(Secp256r1PublicKey::from_bytes(bytes).map_err(bad)?)
            }
            other => return Err(CryptoError::UnsupportedScheme(other)),
        })
    }

    /// `flag || key` bytes, the form embedded in serialized signatures.
    pub fn to_flagged_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.as_bytes().len());
        out.push(self.scheme().flag());
        out.extend_from_slice(self.as_bytes());
        out
    }

    pub fn from_flagged_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let (&flag, rest) = bytes
            .split_first()
            .ok_or_else(|| CryptoError::InvalidKey("empty public key".into()))?;
        let scheme = SignatureScheme::from_flag(flag).ok_or(CryptoError::UnknownFlag(flag))?;
        Self::from_raw(scheme, rest)
    }

    /// Base64 of the flagged bytes.
    pub fn to_base64(&self) -> String {
        base64_encode(&self.to_flagged_bytes())
    }

    pub fn to_address(&self) -> String {
        address_for(self.scheme().flag(), self.as_bytes())
    }

    /// Verify a raw 64-byte signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
        let bad = |e: fastcrypto::error::FastCryptoError| CryptoError::InvalidSignature(e.to_string());
        match self {
            PublicKey::Ed25519(pk) => {
                let sig = <Ed25519Signature as ToFromBytes>::from_bytes(signature).map_err(bad)?;
                pk.verify(message, &sig).map_err(bad)
            }
            PublicKey::Secp256k1(pk) => {
                let sig = <Secp256k1Signature as ToFromBytes>::from_bytes(signature).map_err(bad)?;
                pk.verify(message, &sig).map_err(bad)
            }
            PublicKey::Secp256r1(pk) => {
                let sig = <Secp256r1Signature as ToFromBytes>::from_bytes(signature).map_err(bad)?;
                pk.verify(message, &sig).map_err(bad)
            }
            // Passkey signatures wrap WebAuthn assertions, not raw digests.
            PublicKey::Passkey(_) => Err(CryptoError::UnsupportedScheme(SignatureScheme::Passkey)),
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}, 0x{})", self.scheme(), hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

enum Inner {
    Ed25519(Ed25519KeyPair),
    Secp256k1(Secp256k1KeyPair),
    Secp256r1(Secp256r1KeyPair),
}

/// A signing keypair together with its 32-byte secret.
pub struct Keypair {
    scheme: SignatureScheme,
    secret: [u8; SECRET_KEY_LENGTH],
    inner: Inner,
}

impl Keypair {
    /// Fresh random keypair.
    pub fn generate(scheme: SignatureScheme) -> CryptoResult<Self> {
        if !scheme.has_secret_key() {
            return Err(CryptoError::UnsupportedScheme(scheme));
        }
        let mut rng = rand::thread_rng();
        loop {
            let mut secret = [0u8; SECRET_KEY_LENGTH];
            rng.fill_bytes(&mut secret);
            // Out-of-range scalars are astronomically rare; draw again.
            match Self::from_secret_key(scheme, &secret) {
                Ok(kp) => return Ok(kp),
                Err(e) => trace!("discarding generated secret: {}", e),
            }
        }
    }

    pub fn from_secret_key(scheme: SignatureScheme, secret: &[u8]) -> CryptoResult<Self> {
        let secret: [u8; SECRET_KEY_LENGTH] = secret.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "expected {} secret key bytes, got {}",
                SECRET_KEY_LENGTH,
                secret.len()
            ))
        })?;
        let bad = |e: fastcrypto::error::FastCryptoError| {
            CryptoError::InvalidKey(format!("{} secret key: {}", scheme, e))
        };
        let inner = match scheme {
            SignatureScheme::Ed25519 => Inner::Ed25519(Ed25519KeyPair::from(
                Ed25519PrivateKey::from_bytes(&secret).map_err(bad)?,
            )),
            SignatureScheme::Secp256k1 => Inner::Secp256k1(Secp256k1KeyPair::from(
                Secp256k1PrivateKey::from_bytes(&secret).map_err(bad)?,
            )),
            SignatureScheme::Secp256r1 => Inner::Secp256r1(Secp256r1KeyPair::from(
                Secp256r1PrivateKey::from_bytes(&secret).map_err(bad)?,
            )),
            other => return Err(CryptoError::UnsupportedScheme(other)),
        };
        Ok(Self {
            scheme,
            secret,
            inner,
        })
    }

    /// Rebuild a keypair from a decoded private key.
    pub fn from_parsed(parsed: &ParsedKeypair) -> CryptoResult<Self> {
        Self::from_secret_key(parsed.schema, &parsed.secret_key)
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn secret_key(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.secret
    }

    pub fn export(&self) -> ParsedKeypair {
        ParsedKeypair {
            schema: self.scheme,
            secret_key: self.secret,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.inner {
            Inner::Ed25519(kp) => PublicKey::Ed25519(kp.public().clone()),
            Inner::Secp256k1(kp) => PublicKey::Secp256k1(kp.public().clone()),
            Inner::Secp256r1(kp) => PublicKey::Secp256r1(kp.public().clone()),
        }
    }

    pub fn to_address(&self) -> String {
        self.public_key().to_address()
    }

    /// Raw 64-byte signature over `message`. The secp256 schemes hash with
    /// SHA-256 first.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match &self.inner {
            Inner::Ed25519(kp) => {
                let sig: Ed25519Signature = kp.sign(message);
                sig.as_ref().to_vec()
            }
            Inner::Secp256k1(kp) => {
                let sig: Secp256k1Signature = kp.sign(message);
                sig.as_ref().to_vec()
            }
            Inner::Secp256r1(kp) => {
                let sig: Secp256r1Signature = kp.sign(message);
                sig.as_ref().to_vec()
            }
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("scheme", &self.scheme)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMES: [SignatureScheme; 3] = [
        SignatureScheme::Ed25519,
        SignatureScheme::Secp256k1,
        SignatureScheme::Secp256r1,
    ];

    #[test]
    fn test_generate_sign_verify() {
        for scheme in SCHEMES {
            let kp = Keypair::generate(scheme).unwrap();
            let sig = kp.sign(b"hello");
            assert_eq!(sig.len(), SIGNATURE_LENGTH);
            kp.public_key().verify(b"hello", &sig).unwrap();
            assert!(kp.public_key().verify(b"other", &sig).is_err());
        }
    }

    #[test]
    fn test_secret_round_trip_keeps_address() {
        for scheme in SCHEMES {
            let kp = Keypair::generate(scheme).unwrap();
            let again = Keypair::from_parsed(&kp.export()).unwrap();
            assert_eq!(kp.to_address(), again.to_address());
        }
    }

    #[test]
    fn test_address_differs_by_flag() {
        let ed = Keypair::from_secret_key(SignatureScheme::Ed25519, &[1u8; 32]).unwrap();
        let addr = ed.to_address();
        assert_eq!(addr.len(), 66);
        assert_ne!(addr, address_for(0x01, ed.public_key().as_bytes()));
    }

    #[test]
    fn test_flagged_bytes_round_trip() {
        let kp = Keypair::from_secret_key(SignatureScheme::Secp256k1, &[9u8; 32]).unwrap();
        let pk = kp.public_key();
        let flagged = pk.to_flagged_bytes();
        assert_eq!(flagged[0], 0x01);
        assert_eq!(flagged.len(), 34);
        assert_eq!(PublicKey::from_flagged_bytes(&flagged).unwrap(), pk);
    }

    #[test]
    fn test_passkey_cannot_generate() {
        assert_eq!(
            Keypair::generate(SignatureScheme::Passkey).unwrap_err(),
            CryptoError::UnsupportedScheme(SignatureScheme::Passkey)
        );
    }

    #[test]
    fn test_wrong_secret_length() {
        let err = Keypair::from_secret_key(SignatureScheme::Ed25519, &[0u8; 31]).unwrap_err();
        assert!(err.to_string().contains("31"));
    }
}
