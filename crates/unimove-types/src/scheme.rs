//! Signature schemes and decoded private keys.
//!
//! Flags match the one-byte prefixes both chains use in serialized
//! signatures, public keys and Bech32 private keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Signature scheme, identified on the wire by a one-byte flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[serde(rename = "ED25519")]
    Ed25519,
    #[serde(rename = "Secp256k1")]
    Secp256k1,
    #[serde(rename = "Secp256r1")]
    Secp256r1,
    #[serde(rename = "MultiSig")]
    MultiSig,
    #[serde(rename = "ZkLogin")]
    ZkLogin,
    #[serde(rename = "Passkey")]
    Passkey,
}

impl SignatureScheme {
    pub const fn flag(&self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => 0x00,
            SignatureScheme::Secp256k1 => 0x01,
            SignatureScheme::Secp256r1 => 0x02,
            SignatureScheme::MultiSig => 0x03,
            SignatureScheme::ZkLogin => 0x05,
            SignatureScheme::Passkey => 0x06,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0x00 => Some(SignatureScheme::Ed25519),
            0x01 => Some(SignatureScheme::Secp256k1),
            0x02 => Some(SignatureScheme::Secp256r1),
            0x03 => Some(SignatureScheme::MultiSig),
            0x05 => Some(SignatureScheme::ZkLogin),
            0x06 => Some(SignatureScheme::Passkey),
            _ => None,
        }
    }

    /// Schemes whose secret key is a plain 32-byte scalar.
    pub const fn has_secret_key(&self) -> bool {
        matches!(
            self,
            SignatureScheme::Ed25519 | SignatureScheme::Secp256k1 | SignatureScheme::Secp256r1
        )
    }

    pub const fn name(&self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "ED25519",
            SignatureScheme::Secp256k1 => "Secp256k1",
            SignatureScheme::Secp256r1 => "Secp256r1",
            SignatureScheme::MultiSig => "MultiSig",
            SignatureScheme::ZkLogin => "ZkLogin",
            SignatureScheme::Passkey => "Passkey",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ed25519" => Ok(SignatureScheme::Ed25519),
            "secp256k1" => Ok(SignatureScheme::Secp256k1),
            "secp256r1" => Ok(SignatureScheme::Secp256r1),
            "multisig" => Ok(SignatureScheme::MultiSig),
            "zklogin" => Ok(SignatureScheme::ZkLogin),
            "passkey" => Ok(SignatureScheme::Passkey),
            other => Err(format!("Unknown signature scheme: {}", other)),
        }
    }
}

/// A private key decoded from its Bech32 text form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedKeypair {
    pub schema: SignatureScheme,
    #[serde(with = "hex_bytes")]
    pub secret_key: [u8; 32],
}

// Keep secrets out of logs.
impl fmt::Debug for ParsedKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedKeypair")
            .field("schema", &self.schema)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let raw = hex::decode(text.trim_start_matches("0x")).map_err(D::Error::custom)?;
        raw.try_into()
            .map_err(|_| D::Error::custom("secret key must be 32 bytes"))
    }
}
