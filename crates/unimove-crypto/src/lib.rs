//! Key material and signatures shared by the Sui and IOTA backends.
//!
//! Both chains use the same schemes, flags, digests and address derivation;
//! they differ only in the Bech32 prefix of exported private keys.

pub mod error;
pub mod keypair;
pub mod multisig;
pub mod passkey;
pub mod personal_message;
pub mod private_key;
pub mod zklogin;

pub use error::{CryptoError, CryptoResult};
pub use keypair::{address_for, Keypair, PublicKey};
pub use multisig::{MultiSigPublicKey, MultiSigSignature};
pub use personal_message::{
    personal_message_digest, sign_personal_message, verify_personal_message_signature,
    SerializedSignature, SignedMessage,
};
pub use private_key::{
    decode_private_key, encode_private_key, IOTA_PRIVATE_KEY_PREFIX, SUI_PRIVATE_KEY_PREFIX,
};
