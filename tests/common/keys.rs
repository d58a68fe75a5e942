//! Deterministic key material for tests.

use unimove::Chain;
use unimove::chains::CryptographyNamespace;
use unimove_crypto::Keypair;
use unimove_types::SignatureScheme;

/// An Ed25519 keypair whose secret is `[seed; 32]`.
#[allow(dead_code)]
pub fn fixed_keypair(seed: u8) -> Keypair {
    Keypair::from_secret_key(SignatureScheme::Ed25519, &[seed; 32])
        .expect("32-byte ed25519 secret")
}

/// [`fixed_keypair`] exported with `C`'s private-key prefix.
#[allow(dead_code)]
pub fn fixed_secret_key<C: Chain>(seed: u8) -> String {
    C::modules()
        .cryptography
        .encode_private_key(SignatureScheme::Ed25519, &[seed; 32])
        .expect("encodable secret")
}
