//! Lazy, single-flight SDK loading.
//!
//! The first request for a chain starts the load; every later request for
//! the same chain, including ones made while the load is still running,
//! gets a clone of the same shared future. The outcome is cached for the
//! life of the cache, failures included. [`SdkCache::evict`] is the only
//! way to retry a failed chain.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};
use unimove_types::{ChainId, ConfigurationError};

use crate::chains::{visit_chain, Chain, ChainVisitor};
use crate::error::SdkLoadError;
use crate::registry::registry;
use crate::sdk::{AnySdk, NormalizedSdk};

pub type SdkResult = Result<AnySdk, SdkLoadError>;

/// The shared handle every caller of [`SdkCache::get`] receives.
pub type SdkFuture = Shared<BoxFuture<'static, SdkResult>>;

/// Produces a chain's normalized SDK.
#[async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self, chain: ChainId) -> SdkResult;
}

/// Builds SDKs from the compiled-in chain modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryLoader;

struct BuildSdk;

impl ChainVisitor for BuildSdk {
    type Output = AnySdk;

    fn visit<C: Chain>(self) -> AnySdk {
        C::wrap_sdk(Arc::new(NormalizedSdk::<C>::new()))
    }
}

#[async_trait]
impl SdkLoader for RegistryLoader {
    async fn load(&self, chain: ChainId) -> SdkResult {
        if !registry().bundle(chain).is_available() {
            return Err(SdkLoadError::new(chain, "backend not compiled in"));
        }
        Ok(visit_chain(chain, BuildSdk))
    }
}

/// Where a chain's load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotRequested,
    Loading,
    Ready,
    Failed,
}

pub struct SdkCache {
    loader: Arc<dyn SdkLoader>,
    entries: Mutex<HashMap<ChainId, SdkFuture>>,
}

impl Default for SdkCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SdkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("SdkCache")
            .field("chains", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SdkCache {
    pub fn new() -> Self {
        Self::with_loader(Arc::new(RegistryLoader))
    }

    pub fn with_loader(loader: Arc<dyn SdkLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The shared load for `chain`, started on first request.
    pub fn get(&self, chain: ChainId) -> SdkFuture {
        let mut entries = self.entries.lock();
        entries
            .entry(chain)
            .or_insert_with(|| {
                debug!(%chain, "starting SDK load");
                let loader = Arc::clone(&self.loader);
                async move {
                    let result = loader.load(chain).await;
                    match &result {
                        Ok(_) => debug!(%chain, "SDK loaded"),
                        Err(e) => warn!(%chain, error = %e, "SDK load failed"),
                    }
                    result
                }
                .boxed()
                .shared()
            })
            .clone()
    }

    /// [`SdkCache::get`] for a chain named by a string. An unknown name
    /// fails here, before any future exists.
    pub fn get_str(&self, chain: &str) -> Result<SdkFuture, ConfigurationError> {
        Ok(self.get(chain.parse()?))
    }

    /// The loaded SDK for a chain type.
    pub async fn get_typed<C: Chain>(&self) -> Result<Arc<NormalizedSdk<C>>, SdkLoadError> {
        let sdk = self.get(C::ID).await?;
        C::unwrap_sdk(&sdk)
            .ok_or_else(|| SdkLoadError::new(C::ID, format!("loader returned a {} SDK", sdk.chain())))
    }

    pub fn state(&self, chain: ChainId) -> LoadState {
        match self.entries.lock().get(&chain) {
            None => LoadState::NotRequested,
            Some(entry) => match entry.peek() {
                None => LoadState::Loading,
                Some(Ok(_)) => LoadState::Ready,
                Some(Err(_)) => LoadState::Failed,
            },
        }
    }

    /// Forget `chain`'s outcome so the next request loads again.
    pub fn evict(&self, chain: ChainId) -> bool {
        self.entries.lock().remove(&chain).is_some()
    }
}

static SDK_CACHE: LazyLock<SdkCache> = LazyLock::new(SdkCache::new);

/// The process-wide cache.
pub fn sdk_cache() -> &'static SdkCache {
    &SDK_CACHE
}

pub async fn get_sdk<C: Chain>() -> Result<Arc<NormalizedSdk<C>>, SdkLoadError> {
    sdk_cache().get_typed::<C>().await
}

/// Load by chain name. The name is validated synchronously.
pub fn get_sdk_by_id(chain: &str) -> Result<SdkFuture, ConfigurationError> {
    sdk_cache().get_str(chain)
}
