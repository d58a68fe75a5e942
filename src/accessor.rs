//! Reusable getters bound to one capability.
//!
//! An accessor is created once per capability and then asked for any
//! chain's module. With a chain type the answer is precisely typed; with a
//! runtime [`ChainId`] it is a type-erased [`Capability`].
//!
//! ```ignore
//! let cryptography = create_accessor::<CryptographyCap>();
//! let sui: &SuiCryptographyModule = cryptography.get::<Sui>();
//! let ed25519 = create_keypair_accessor::<Ed25519Cap>();
//! let kp = ed25519.get::<Iota>().generate()?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use unimove_types::{ChainId, ConfigurationError};

use crate::chains::{Chain, ChainModules, KeypairModule, KeypairModules, PasskeyModule};
use crate::registry::{registry, Capability};

/// Names one module slot of [`ChainModules`].
pub trait ModuleSelector: 'static {
    /// Registry path.
    const NAME: &'static str;
    type Module<C: Chain>: 'static;

    fn select<C: Chain>(modules: &'static ChainModules<C>) -> &'static Self::Module<C>;
}

macro_rules! module_selector {
    ($(#[$doc:meta])* $selector:ident, $path:literal, $field:ident, $assoc:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $selector;

        impl ModuleSelector for $selector {
            const NAME: &'static str = $path;
            type Module<C: Chain> = <C as Chain>::$assoc;

            fn select<C: Chain>(modules: &'static ChainModules<C>) -> &'static Self::Module<C> {
                &modules.$field
            }
        }
    };
}

module_selector!(ClientCap, "client", client, Client);
module_selector!(BcsCap, "bcs", bcs, Bcs);
module_selector!(TransactionsCap, "transactions", transactions, Transactions);
module_selector!(UtilsCap, "utils", utils, Utils);
module_selector!(VerifyCap, "verify", verify, Verify);
module_selector!(CryptographyCap, "cryptography", cryptography, Cryptography);
module_selector!(MultisigCap, "multisig", multisig, Multisig);
module_selector!(FaucetCap, "faucet", faucet, Faucet);
module_selector!(
    /// `Absent` on chains without zkLogin.
    ZkLoginCap,
    "zklogin",
    zklogin,
    Zklogin
);

/// The whole `keypairs` tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypairsCap;

impl ModuleSelector for KeypairsCap {
    const NAME: &'static str = "keypairs";
    type Module<C: Chain> = KeypairModules<C>;

    fn select<C: Chain>(modules: &'static ChainModules<C>) -> &'static KeypairModules<C> {
        &modules.keypairs
    }
}

pub struct ModuleAccessor<M>(PhantomData<fn() -> M>);

impl<M: ModuleSelector> ModuleAccessor<M> {
    pub fn name(&self) -> &'static str {
        M::NAME
    }

    pub fn get<C: Chain>(&self) -> &'static M::Module<C> {
        M::select(C::modules())
    }

    pub fn for_chain(&self, chain: ChainId) -> Capability {
        registry().lookup(chain, M::NAME)
    }
}

impl<M> Clone for ModuleAccessor<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for ModuleAccessor<M> {}

impl<M: ModuleSelector> fmt::Debug for ModuleAccessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleAccessor({})", M::NAME)
    }
}

pub fn create_accessor<M: ModuleSelector>() -> ModuleAccessor<M> {
    ModuleAccessor(PhantomData)
}

/// Names one algorithm under `keypairs`.
pub trait KeypairSelector: 'static {
    /// Algorithm name.
    const NAME: &'static str;
    /// Registry path (`keypairs.<NAME>`).
    const PATH: &'static str;
    type Module<C: Chain>: 'static;

    fn select<C: Chain>(keypairs: &'static KeypairModules<C>) -> &'static Self::Module<C>;
}

macro_rules! keypair_selector {
    ($selector:ident, $name:literal, $field:ident, $module:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $selector;

        impl KeypairSelector for $selector {
            const NAME: &'static str = $name;
            const PATH: &'static str = concat!("keypairs.", $name);
            type Module<C: Chain> = $module<C>;

            fn select<C: Chain>(keypairs: &'static KeypairModules<C>) -> &'static $module<C> {
                &keypairs.$field
            }
        }
    };
}

keypair_selector!(Ed25519Cap, "ed25519", ed25519, KeypairModule);
keypair_selector!(Secp256k1Cap, "secp256k1", secp256k1, KeypairModule);
keypair_selector!(Secp256r1Cap, "secp256r1", secp256r1, KeypairModule);
keypair_selector!(PasskeyCap, "passkey", passkey, PasskeyModule);

pub struct KeypairAccessor<A>(PhantomData<fn() -> A>);

impl<A: KeypairSelector> KeypairAccessor<A> {
    pub fn algorithm(&self) -> &'static str {
        A::NAME
    }

    pub fn get<C: Chain>(&self) -> &'static A::Module<C> {
        A::select(&C::modules().keypairs)
    }

    pub fn for_chain(&self, chain: ChainId) -> Capability {
        registry().lookup(chain, A::PATH)
    }
}

impl<A> Clone for KeypairAccessor<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for KeypairAccessor<A> {}

impl<A: KeypairSelector> fmt::Debug for KeypairAccessor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeypairAccessor({})", A::NAME)
    }
}

pub fn create_keypair_accessor<A: KeypairSelector>() -> KeypairAccessor<A> {
    KeypairAccessor(PhantomData)
}

/// An accessor keyed by a runtime path, for callers that only have strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAccessor {
    path: String,
}

impl NamedAccessor {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn for_chain(&self, chain: ChainId) -> Capability {
        registry().lookup(chain, &self.path)
    }

    pub fn for_chain_str(&self, chain: &str) -> Result<Capability, ConfigurationError> {
        registry().lookup_str(chain, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::iota::IotaUtilsModule;
    use crate::chains::sui::SuiUtilsModule;
    use crate::chains::{Absent, Iota, KeypairNamespace, Sui, UtilsNamespace};
    use unimove_types::SignatureScheme;

    #[test]
    fn test_typed_accessor_returns_chain_module() {
        let utils = create_accessor::<UtilsCap>();
        let sui: &SuiUtilsModule = utils.get::<Sui>();
        let iota: &IotaUtilsModule = utils.get::<Iota>();
        assert_eq!(sui.native_coin_type(), "0x2::sui::SUI");
        assert_eq!(iota.native_coin_type(), "0x2::iota::IOTA");
    }

    #[test]
    fn test_runtime_accessor_matches_typed() {
        let utils = create_accessor::<UtilsCap>();
        let erased = utils.for_chain(ChainId::Iota).downcast::<IotaUtilsModule>();
        assert!(std::ptr::eq(erased.unwrap(), utils.get::<Iota>()));
    }

    #[test]
    fn test_zklogin_accessor_on_iota_is_absent() {
        let zk = create_accessor::<ZkLoginCap>();
        let _: &Absent = zk.get::<Iota>();
        assert!(zk.for_chain(ChainId::Iota).is_absent());
        assert!(zk.for_chain(ChainId::Sui).is_present());
    }

    #[test]
    fn test_keypair_accessor() {
        let k1 = create_keypair_accessor::<Secp256k1Cap>();
        assert_eq!(k1.get::<Sui>().scheme(), SignatureScheme::Secp256k1);
        assert!(k1.for_chain(ChainId::Iota).is_present());
        assert_eq!(Secp256k1Cap::PATH, "keypairs.secp256k1");
        let passkey = create_keypair_accessor::<PasskeyCap>();
        assert!(passkey.for_chain(ChainId::Sui).is_present());
    }

    #[test]
    fn test_named_accessor() {
        let faucet = NamedAccessor::new("faucet");
        assert!(faucet.for_chain(ChainId::Sui).is_present());
        assert!(faucet.for_chain_str("near").is_err());
        assert!(NamedAccessor::new("wallets").for_chain(ChainId::Sui).is_absent());
    }
}
