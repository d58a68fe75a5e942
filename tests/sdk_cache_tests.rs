//! SDK loading: single flight, failure caching, shape parity.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{assert_err, assert_error_contains, assert_ok, fixed_secret_key};
use unimove::loader::{RegistryLoader, SdkResult};
use unimove::chains::CryptographyNamespace;
use unimove::{
    get_sdk, get_sdk_by_id, sdk_cache, AnySdk, Chain, ChainId, Iota, LoadState, NormalizedSdk,
    SdkCache, SdkLoadError, SdkLoader, Sui,
};

/// Delays every load so concurrent callers overlap, and counts loads.
struct SlowLoader {
    calls: AtomicUsize,
    fail: Option<ChainId>,
}

impl SlowLoader {
    fn new(fail: Option<ChainId>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SdkLoader for SlowLoader {
    async fn load(&self, chain: ChainId) -> SdkResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail == Some(chain) {
            return Err(SdkLoadError::new(chain, "module resolution failed"));
        }
        RegistryLoader.load(chain).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loads_resolve_to_one_instance() {
    let loader = SlowLoader::new(None);
    let cache = Arc::new(SdkCache::with_loader(loader.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get(ChainId::Iota).await })
        })
        .collect();

    let mut loaded: Vec<AnySdk> = Vec::new();
    for handle in handles {
        loaded.push(assert_ok(handle.await.unwrap(), "iota load"));
    }

    assert_eq!(loader.calls(), 1);
    assert!(loaded.iter().all(|sdk| sdk.ptr_eq(&loaded[0])));
    assert_eq!(loaded[0].chain(), ChainId::Iota);
}

#[tokio::test]
async fn test_failed_load_is_cached_and_not_retried() {
    let loader = SlowLoader::new(Some(ChainId::Sui));
    let cache = SdkCache::with_loader(loader.clone());

    let first = assert_err(cache.get(ChainId::Sui).await, "sui load");
    let second = assert_err(cache.get(ChainId::Sui).await, "sui load again");
    assert_eq!(first, second);
    assert_eq!(loader.calls(), 1);
    assert_eq!(cache.state(ChainId::Sui), LoadState::Failed);
    assert_error_contains(&first, "Failed to load Sui SDK", "load error");
    assert_error_contains(&first, "unimove/sui", "load error names the requirement");

    // Other chains are unaffected.
    assert_ok(cache.get(ChainId::Iota).await, "iota load");
    assert_eq!(cache.state(ChainId::Iota), LoadState::Ready);
}

#[test]
fn test_unknown_chain_is_rejected_before_loading() {
    let err = get_sdk_by_id("solana")
        .err()
        .expect("unknown chain should be rejected");
    assert_error_contains(&err, "solana", "configuration error");
}

#[test]
fn test_chain_ids_must_match_exactly() {
    for raw in ["SUI", "Iota", " sui ", "iota "] {
        let err = get_sdk_by_id(raw)
            .err()
            .expect("non-canonical chain id should be rejected");
        assert_eq!(err.chain, raw);
    }
}

#[tokio::test]
async fn test_global_cache_returns_same_sdk() {
    let a = assert_ok(get_sdk::<Sui>().await, "sui sdk");
    let b = assert_ok(get_sdk::<Sui>().await, "sui sdk again");
    assert!(Arc::ptr_eq(&a, &b));

    let by_id = assert_ok(get_sdk_by_id("sui").unwrap().await, "sui by id");
    assert!(Arc::ptr_eq(&a, &by_id.downcast::<Sui>().unwrap()));
    assert!(by_id.downcast::<Iota>().is_none());
}

#[test]
fn test_normalized_shape_is_identical_across_chains() {
    let sui = NormalizedSdk::<Sui>::new().describe();
    let iota = NormalizedSdk::<Iota>::new().describe();
    assert_eq!(
        sui.keys().collect::<Vec<_>>(),
        iota.keys().collect::<Vec<_>>()
    );

    // Only the chain-specific members differ, and only in presence.
    assert!(sui["zklogin"]);
    assert!(!iota["zklogin"]);
    assert!(!sui["client.network"]);
    assert!(iota["client.network"]);
    let differing: Vec<_> = sui
        .iter()
        .filter(|(name, present)| iota[*name] != **present)
        .map(|(name, _)| *name)
        .collect();
    assert_eq!(differing, vec!["client.network", "zklogin"]);
}

#[tokio::test]
async fn test_decode_private_key_is_idempotent() {
    let sdk = assert_ok(get_sdk_by_id("iota").unwrap().await, "iota sdk");
    let secret = fixed_secret_key::<Iota>(9);
    let first = assert_ok(sdk.decode_private_key(&secret), "decode");
    let second = assert_ok(sdk.decode_private_key(&secret), "decode again");
    assert_eq!(first, second);

    // A Sui key is not an IOTA key.
    let err = assert_err(sdk.decode_private_key(&fixed_secret_key::<Sui>(9)), "cross-chain decode");
    assert_eq!(err.chain, ChainId::Iota);
}

#[tokio::test]
async fn test_malformed_key_leaves_cached_sdk_usable() {
    let sdk = assert_ok(get_sdk_by_id("iota").unwrap().await, "iota sdk");
    let bad = "iotaprivkey1notakey";
    let err = assert_err(sdk.decode_private_key(bad), "malformed key");
    let raw = Iota::modules()
        .cryptography
        .decode_private_key(bad)
        .err()
        .expect("raw decoder rejects malformed key");
    assert_eq!(err.chain, ChainId::Iota);
    assert_eq!(err.message, raw.to_string());

    let again = assert_ok(get_sdk_by_id("iota").unwrap().await, "iota sdk after failure");
    assert!(again.ptr_eq(&sdk));
    assert_eq!(sdk_cache().state(ChainId::Iota), LoadState::Ready);
    let secret = fixed_secret_key::<Iota>(11);
    let decoded = assert_ok(again.decode_private_key(&secret), "decode after failure");
    assert_eq!(decoded, assert_ok(sdk.decode_private_key(&secret), "decode on first handle"));
}
