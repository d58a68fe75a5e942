//! The chain registry: one immutable capability bundle per chain.
//!
//! Bundles are type-erased so they can be addressed by string paths
//! (`"client"`, `"keypairs.ed25519"`). Typed access goes through
//! [`crate::accessor`] or [`crate::chains::Chain::modules`] instead.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use tracing::debug;
use unimove_types::{ChainId, ConfigurationError};

use crate::chains::{visit_chain, Absent, Chain, ChainVisitor, ClientNamespace};
use crate::dispatch::Operation;
use crate::operations;

/// A capability looked up in the registry.
#[derive(Clone, Copy)]
pub enum Capability {
    Present(&'static (dyn Any + Send + Sync)),
    Absent,
}

impl Capability {
    fn of<T: Any + Send + Sync>(value: &'static T) -> Self {
        if TypeId::of::<T>() == TypeId::of::<Absent>() {
            Capability::Absent
        } else {
            Capability::Present(value)
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Capability::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    /// The module as `T`, if present and of that type.
    pub fn downcast<T: Any>(&self) -> Option<&'static T> {
        match *self {
            Capability::Present(value) => value.downcast_ref::<T>(),
            Capability::Absent => None,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Present(_) => f.write_str("Present"),
            Capability::Absent => f.write_str("Absent"),
        }
    }
}

/// Everything one chain provides.
pub struct CapabilityBundle {
    chain: ChainId,
    available: bool,
    modules: BTreeMap<&'static str, Capability>,
    operations: BTreeMap<&'static str, Operation>,
}

impl CapabilityBundle {
    /// The bundle for chain `C`. An unavailable chain keeps its module
    /// names, all absent, and offers no operations.
    pub fn for_chain<C: Chain>() -> Self {
        let m = C::modules();
        let mut modules: BTreeMap<&'static str, Capability> = BTreeMap::new();
        modules.insert("client", Capability::of(&m.client));
        modules.insert("client.network", Capability::of(m.client.network_tools()));
        modules.insert("bcs", Capability::of(&m.bcs));
        modules.insert("transactions", Capability::of(&m.transactions));
        modules.insert("utils", Capability::of(&m.utils));
        modules.insert("verify", Capability::of(&m.verify));
        modules.insert("cryptography", Capability::of(&m.cryptography));
        modules.insert("multisig", Capability::of(&m.multisig));
        modules.insert("faucet", Capability::of(&m.faucet));
        modules.insert("zklogin", Capability::of(&m.zklogin));
        modules.insert("keypairs", Capability::of(&m.keypairs));
        modules.insert("keypairs.ed25519", Capability::of(&m.keypairs.ed25519));
        modules.insert("keypairs.secp256k1", Capability::of(&m.keypairs.secp256k1));
        modules.insert("keypairs.secp256r1", Capability::of(&m.keypairs.secp256r1));
        modules.insert("keypairs.passkey", Capability::of(&m.keypairs.passkey));

        let available = C::available();
        let mut operations = BTreeMap::new();
        if available {
            operations.extend(operations::standard_operations::<C>());
            operations.extend(C::extra_operations());
        } else {
            for value in modules.values_mut() {
                *value = Capability::Absent;
            }
        }
        debug!(
            chain = %C::ID,
            available,
            operations = operations.len(),
            "built capability bundle"
        );

        Self {
            chain: C::ID,
            available,
            modules,
            operations,
        }
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// Whether the chain's backend is compiled in.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Unknown paths are absent.
    pub fn module(&self, path: &str) -> Capability {
        self.modules
            .get(path)
            .copied()
            .unwrap_or(Capability::Absent)
    }

    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }

    pub fn operation(&self, name: &str) -> Option<Operation> {
        self.operations.get(name).copied()
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.keys().copied()
    }
}

impl fmt::Debug for CapabilityBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityBundle")
            .field("chain", &self.chain)
            .field("available", &self.available)
            .field("modules", &self.modules)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct BuildBundle;

impl ChainVisitor for BuildBundle {
    type Output = CapabilityBundle;

    fn visit<C: Chain>(self) -> CapabilityBundle {
        CapabilityBundle::for_chain::<C>()
    }
}

/// One bundle per [`ChainId`], indexed by [`ChainId::index`].
pub struct ChainRegistry {
    bundles: [CapabilityBundle; ChainId::ALL.len()],
}

impl ChainRegistry {
    pub fn build() -> Self {
        Self {
            bundles: ChainId::ALL.map(|chain| visit_chain(chain, BuildBundle)),
        }
    }

    pub fn bundle(&self, chain: ChainId) -> &CapabilityBundle {
        &self.bundles[chain.index()]
    }

    /// Bundle for a chain named at an external boundary.
    pub fn bundle_str(&self, chain: &str) -> Result<&CapabilityBundle, ConfigurationError> {
        Ok(self.bundle(chain.parse()?))
    }

    pub fn lookup(&self, chain: ChainId, path: &str) -> Capability {
        self.bundle(chain).module(path)
    }

    pub fn lookup_str(&self, chain: &str, path: &str) -> Result<Capability, ConfigurationError> {
        Ok(self.bundle_str(chain)?.module(path))
    }

    pub fn operation(&self, chain: ChainId, name: &str) -> Option<Operation> {
        self.bundle(chain).operation(name)
    }

    pub fn bundles(&self) -> impl Iterator<Item = &CapabilityBundle> {
        self.bundles.iter()
    }

    /// Chains whose backends are compiled in.
    pub fn available_chains(&self) -> Vec<ChainId> {
        self.bundles
            .iter()
            .filter(|b| b.available)
            .map(|b| b.chain)
            .collect()
    }
}

impl fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bundles.iter()).finish()
    }
}

static REGISTRY: LazyLock<ChainRegistry> = LazyLock::new(ChainRegistry::build);

/// The process-wide registry.
pub fn registry() -> &'static ChainRegistry {
    &REGISTRY
}

/// Direct, un-normalized access to one chain's module by path.
pub fn get_module(chain: ChainId, name: &str) -> Capability {
    registry().lookup(chain, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::iota::{IotaCryptographyModule, IotaNetworkTools};
    use crate::chains::sui::{SuiClientModule, ZkLoginModule};
    use crate::chains::KeypairModule;
    use crate::chains::Sui;

    #[test]
    fn test_every_chain_has_one_bundle() {
        let reg = registry();
        for chain in ChainId::ALL {
            assert_eq!(reg.bundle(chain).chain(), chain);
        }
        assert_eq!(reg.bundles().count(), ChainId::ALL.len());
    }

    #[test]
    fn test_lookup_typed_modules() {
        let reg = registry();
        assert!(reg
            .lookup(ChainId::Sui, "client")
            .downcast::<SuiClientModule>()
            .is_some());
        assert!(reg
            .lookup(ChainId::Iota, "cryptography")
            .downcast::<IotaCryptographyModule>()
            .is_some());
        assert!(reg
            .lookup(ChainId::Sui, "keypairs.ed25519")
            .downcast::<KeypairModule<Sui>>()
            .is_some());
    }

    #[test]
    fn test_chain_unique_members_are_absent_elsewhere() {
        let reg = registry();
        assert!(reg
            .lookup(ChainId::Sui, "zklogin")
            .downcast::<ZkLoginModule>()
            .is_some());
        assert!(reg.lookup(ChainId::Iota, "zklogin").is_absent());
        assert!(reg.lookup(ChainId::Sui, "client.network").is_absent());
        assert!(reg
            .lookup(ChainId::Iota, "client.network")
            .downcast::<IotaNetworkTools>()
            .is_some());
    }

    #[test]
    fn test_unknown_path_is_absent() {
        assert!(get_module(ChainId::Sui, "no.such.module").is_absent());
    }

    #[test]
    fn test_unknown_chain_string_is_configuration_error() {
        let err = registry().lookup_str("solana", "client").unwrap_err();
        assert_eq!(err.chain, "solana");
    }

    #[test]
    fn test_module_names_match_across_chains() {
        let reg = registry();
        let sui: Vec<_> = reg.bundle(ChainId::Sui).module_names().collect();
        let iota: Vec<_> = reg.bundle(ChainId::Iota).module_names().collect();
        assert_eq!(sui, iota);
    }

    #[test]
    fn test_chain_unique_operations() {
        let reg = registry();
        assert!(reg.operation(ChainId::Sui, "decode_jwt").is_some());
        assert!(reg.operation(ChainId::Iota, "decode_jwt").is_none());
        assert!(reg.operation(ChainId::Iota, "get_network").is_some());
        assert!(reg.operation(ChainId::Sui, "get_network").is_none());
        for chain in ChainId::ALL {
            assert!(reg.operation(chain, "parse_struct_tag").is_some());
        }
    }
}
