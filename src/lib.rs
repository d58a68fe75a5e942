//! Unimove: one API over the Sui and IOTA Move SDK surfaces.
//!
//! - **Registry**: per-chain capability bundles, with `Absent` markers where
//!   a chain lacks a module ([`registry`])
//! - **Normalized SDK**: the same member names on every chain ([`sdk`])
//! - **Loader**: lazy, single-flight, failure-caching SDK loads ([`loader`])
//! - **Dispatch**: chain-agnostic operations resolved explicit, then
//!   trailing argument, then ambient ([`dispatch`], [`context`])
//!
//! See [`chains`] for the per-chain modules and [`operations`] for the
//! operation table.

#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]

pub mod accessor;
pub mod chains;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod operations;
pub mod registry;
pub mod sdk;
pub mod wallet;

pub use accessor::{
    create_accessor, create_keypair_accessor, KeypairAccessor, ModuleAccessor, NamedAccessor,
};
pub use chains::{visit_chain, Absent, Chain, ChainModules, ChainVisitor, Iota, Sui, ABSENT};
pub use config::{config, UnimoveConfig};
pub use context::{current_chain, enter_chain, scope_chain, with_chain, ChainGuard};
pub use dispatch::{dispatch, Dispatcher, OperationCaller, OperationState};
pub use error::{
    ConfigurationError, DispatchError, InvalidPrivateKeyError, SdkLoadError, UnimoveError,
    UnimoveResult, UnresolvedChainError, UnsupportedOperationError,
};
pub use loader::{get_sdk, get_sdk_by_id, sdk_cache, LoadState, SdkCache, SdkLoader};
pub use registry::{get_module, registry, Capability, CapabilityBundle, ChainRegistry};
pub use sdk::{AnySdk, NormalizedSdk};
pub use unimove_types::{ChainId, StructTag};
