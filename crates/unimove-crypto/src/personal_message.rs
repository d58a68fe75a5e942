//! Personal message signing and verification.
//!
//! The signed digest is `Blake2b256(intent || bcs(message))` with the
//! personal-message intent `[3, 0, 0]`. Serialized signatures are
//! `base64(flag || signature || public_key)`.

use fastcrypto::hash::{Blake2b256, HashFunction};
use serde::{Deserialize, Serialize};
use unimove_types::encoding::{base64_decode, base64_encode};
use unimove_types::SignatureScheme;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{Keypair, PublicKey, SIGNATURE_LENGTH};

/// Intent scope 3 (personal message), version 0, app id 0.
pub const PERSONAL_MESSAGE_INTENT: [u8; 3] = [3, 0, 0];

pub fn personal_message_digest(message: &[u8]) -> CryptoResult<[u8; 32]> {
    let body = bcs::to_bytes(&message.to_vec())
        .map_err(|e| CryptoError::InvalidSignature(format!("failed to encode message: {}", e)))?;
    let mut input = Vec::with_capacity(PERSONAL_MESSAGE_INTENT.len() + body.len());
    input.extend_from_slice(&PERSONAL_MESSAGE_INTENT);
    input.extend_from_slice(&body);
    Ok(Blake2b256::digest(&input).digest)
}

/// Result of signing a personal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// Base64 of the message bytes.
    pub bytes: String,
    /// Serialized signature.
    pub signature: String,
}

/// A serialized signature split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedSignature {
    pub scheme: SignatureScheme,
    pub signature: Vec<u8>,
    pub public_key: PublicKey,
}

impl SerializedSignature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.scheme.flag()];
        out.extend_from_slice(&self.signature);
        out.extend_from_slice(self.public_key.as_bytes());
        out
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.to_bytes())
    }

    pub fn parse(bytes: &[u8]) -> CryptoResult<Self> {
        let (&flag, rest) = bytes
            .split_first()
            .ok_or_else(|| CryptoError::InvalidSignature("empty signature".into()))?;
        let scheme = SignatureScheme::from_flag(flag).ok_or(CryptoError::UnknownFlag(flag))?;
        if !scheme.has_secret_key() {
            return Err(CryptoError::UnsupportedScheme(scheme));
        }
        if rest.len() <= SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignature(format!(
                "signature too short: {} bytes",
                bytes.len()
            )));
        }
        let (signature, public_key) = rest.split_at(SIGNATURE_LENGTH);
        Ok(Self {
            scheme,
            signature: signature.to_vec(),
            public_key: PublicKey::from_raw(scheme, public_key)?,
        })
    }

    pub fn from_base64(b64: &str) -> CryptoResult<Self> {
        let bytes = base64_decode(b64, "signature")
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Self::parse(&bytes)
    }
}

pub fn sign_personal_message(keypair: &Keypair, message: &[u8]) -> CryptoResult<SignedMessage> {
    let digest = personal_message_digest(message)?;
    let signature = SerializedSignature {
        scheme: keypair.scheme(),
        signature: keypair.sign(&digest),
        public_key: keypair.public_key(),
    };
    Ok(SignedMessage {
        bytes: base64_encode(message),
        signature: signature.to_base64(),
    })
}

/// Verify a serialized signature over `message`, returning the signer's key.
///
/// With `expected_address`, also checks the key derives to that address.
pub fn verify_personal_message_signature(
    message: &[u8],
    signature: &str,
    expected_address: Option<&str>,
) -> CryptoResult<PublicKey> {
    let parsed = SerializedSignature::from_base64(signature)?;
    let digest = personal_message_digest(message)?;
    parsed.public_key.verify(&digest, &parsed.signature)?;
    if let Some(expected) = expected_address {
        let actual = parsed.public_key.to_address();
        if unimove_types::address::normalize_address(expected) != actual {
            return Err(CryptoError::InvalidSignature(format!(
                "signature is valid but signer {} does not match {}",
                actual, expected
            )));
        }
    }
    Ok(parsed.public_key)
}
