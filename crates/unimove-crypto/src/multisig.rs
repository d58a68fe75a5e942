//! Weighted threshold multisig.
//!
//! Address: `Blake2b256(0x03 || threshold_le_u16 || (flag || pk || weight)*)`.
//! A combined signature is a bitmap of signing members plus their partial
//! signatures in member order.

use fastcrypto::hash::{Blake2b256, HashFunction};
use serde::{Deserialize, Serialize};
use unimove_types::address::{address_from_digest, address_to_string};
use unimove_types::SignatureScheme;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::PublicKey;
use crate::personal_message::{personal_message_digest, SerializedSignature};

pub const MAX_SIGNERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigMember {
    pub public_key: PublicKey,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigPublicKey {
    members: Vec<MultiSigMember>,
    threshold: u16,
}

/// Partial signatures combined under one multisig key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigSignature {
    /// Bit `i` set when member `i` signed.
    pub bitmap: u16,
    /// Base64 partial signatures, ascending member index.
    pub signatures: Vec<String>,
}

impl MultiSigPublicKey {
    pub fn new(members: Vec<(PublicKey, u8)>, threshold: u16) -> CryptoResult<Self> {
        if members.is_empty() || members.len() > MAX_SIGNERS {
            return Err(CryptoError::MultiSig(format!(
                "expected 1 to {} members, got {}",
                MAX_SIGNERS,
                members.len()
            )));
        }
        if threshold == 0 {
            return Err(CryptoError::MultiSig("threshold must be positive".into()));
        }
        let mut out: Vec<MultiSigMember> = Vec::with_capacity(members.len());
        for (public_key, weight) in members {
            if weight == 0 {
                return Err(CryptoError::MultiSig("member weight must be positive".into()));
            }
            if public_key.scheme() == SignatureScheme::Passkey
                || out.iter().any(|m| m.public_key == public_key)
            {
                return Err(CryptoError::MultiSig(format!(
                    "duplicate or unsupported member key {}",
                    public_key
                )));
            }
            out.push(MultiSigMember { public_key, weight });
        }
        let total: u32 = out.iter().map(|m| m.weight as u32).sum();
        if u32::from(threshold) > total {
            return Err(CryptoError::MultiSig(format!(
                "threshold {} exceeds total weight {}",
                threshold, total
            )));
        }
        Ok(Self {
            members: out,
            threshold,
        })
    }

    pub fn members(&self) -> &[MultiSigMember] {
        &self.members
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn to_address(&self) -> String {
        let mut input = vec![SignatureScheme::MultiSig.flag()];
        input.extend_from_slice(&self.threshold.to_le_bytes());
        for member in &self.members {
            input.extend_from_slice(&member.public_key.to_flagged_bytes());
            input.push(member.weight);
        }
        address_to_string(&address_from_digest(Blake2b256::digest(&input).digest))
    }

    fn member_index(&self, key: &PublicKey) -> Option<usize> {
        self.members.iter().position(|m| &m.public_key == key)
    }

    /// Combine member signatures. Order of `partials` does not matter.
    pub fn combine_partial_signatures(&self, partials: &[String]) -> CryptoResult<MultiSigSignature> {
        let mut indexed: Vec<(usize, String)> = Vec::with_capacity(partials.len());
        let mut bitmap = 0u16;
        for partial in partials {
            let parsed = SerializedSignature::from_base64(partial)?;
            let index = self.member_index(&parsed.public_key).ok_or_else(|| {
                CryptoError::MultiSig(format!("{} is not a member", parsed.public_key))
            })?;
            if bitmap & (1 << index) != 0 {
                return Err(CryptoError::MultiSig(format!(
                    "member {} signed more than once",
                    index
                )));
            }
            bitmap |= 1 << index;
            indexed.push((index, partial.clone()));
        }
        indexed.sort_by_key(|(i, _)| *i);
        Ok(MultiSigSignature {
            bitmap,
            signatures: indexed.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Check every partial verifies over the personal-message digest and the
    /// signing weight reaches the threshold.
    pub fn verify_personal_message(
        &self,
        message: &[u8],
        signature: &MultiSigSignature,
    ) -> CryptoResult<()> {
        let digest = personal_message_digest(message)?;
        let mut weight: u32 = 0;
        let mut seen = 0u16;
        for partial in &signature.signatures {
            let parsed = SerializedSignature::from_base64(partial)?;
            let index = self.member_index(&parsed.public_key).ok_or_else(|| {
                CryptoError::MultiSig(format!("{} is not a member", parsed.public_key))
            })?;
            if signature.bitmap & (1 << index) == 0 || seen & (1 << index) != 0 {
                return Err(CryptoError::MultiSig(format!(
                    "bitmap does not match signer {}",
                    index
                )));
            }
            seen |= 1 << index;
            parsed.public_key.verify(&digest, &parsed.signature)?;
            weight += self.members[index].weight as u32;
        }
        if seen != signature.bitmap {
            return Err(CryptoError::MultiSig("bitmap names missing signers".into()));
        }
        if weight < u32::from(self.threshold) {
            return Err(CryptoError::MultiSig(format!(
                "signing weight {} below threshold {}",
                weight, self.threshold
            )));
        }
        Ok(())
    }
}
