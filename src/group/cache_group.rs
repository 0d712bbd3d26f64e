//! Group
//!
//! Per-namespace façade tying together the local store, the loader, the
//! peer picker and the request coalescer.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, SharedCache};
use crate::coalesce::Coalescer;
use crate::error::{CacheError, Result};
use crate::group::GroupStats;
use crate::models::PeerRequest;
use crate::peers::{PeerGetter, PeerPicker};

/// Reserved key meaning "no key supplied"; always rejected.
pub const INVALID_KEY: &str = "nil";

// == Getter ==
/// Loads a value for a key from the authoritative source on a cache miss.
///
/// Called at most once at a time per key and group; must tolerate concurrent
/// calls for different keys.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts a plain function into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group ==
/// A named cache namespace.
pub struct Group {
    source: Source,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: Coalescer<ByteView>,
}

/// Owned handles a load needs; cloned into each detached load.
#[derive(Clone)]
struct Source {
    name: Arc<str>,
    getter: Arc<dyn Getter>,
    main_cache: Arc<SharedCache>,
    stats: Arc<GroupStats>,
}

impl Group {
    /// Creates a group whose local store holds at most `cache_bytes`
    /// (0 = unbounded). Register it in a
    /// [`GroupRegistry`](crate::group::GroupRegistry) to serve peers.
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: Arc<dyn Getter>) -> Self {
        Self::with_cache(name, SharedCache::new(cache_bytes), getter)
    }

    /// Creates a group around a preconfigured store.
    pub fn with_cache(name: impl Into<String>, cache: SharedCache, getter: Arc<dyn Getter>) -> Self {
        let name: String = name.into();
        Self {
            source: Source {
                name: Arc::from(name),
                getter,
                main_cache: Arc::new(cache),
                stats: Arc::new(GroupStats::new()),
            },
            peers: OnceLock::new(),
            loader: Coalescer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn stats(&self) -> &GroupStats {
        &self.source.stats
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.source.main_cache.stats().await
    }

    // == Register Peers ==
    /// Attaches the peer picker. A group accepts exactly one.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "peers registered more than once for group {}",
                self.name()
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        let stats = &self.source.stats;
        stats.record_get();
        if key.is_empty() || key == INVALID_KEY {
            return Err(CacheError::InvalidKey);
        }

        if let Some(value) = self.source.main_cache.get(key).await {
            stats.record_cache_hit();
            debug!(group = %self.name(), key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    /// Resolves a miss from the owning peer or the loader; concurrent misses
    /// for one key share a single execution.
    ///
    /// The load runs detached from the caller: once started it finishes
    /// (and populates the store) even if every waiting caller is dropped.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.source.stats.record_load();
        self.loader
            .run(key, || {
                let peer = self.peers.get().and_then(|p| p.pick_peer(key));
                let source = self.source.clone();
                let key = key.to_string();
                async move { source.load(peer, &key).await }
            })
            .await
    }
}

impl Source {
    async fn load(&self, peer: Option<Arc<dyn PeerGetter>>, key: &str) -> Result<ByteView> {
        self.stats.record_load_executed();

        if let Some(peer) = peer {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    self.stats.record_peer_load();
                    return Ok(value);
                }
                Err(err) => {
                    self.stats.record_peer_error();
                    warn!(
                        group = %self.name,
                        key,
                        error = %err,
                        "failed to get from peer, loading locally"
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let request = PeerRequest::new(&*self.name, key);
        let response = peer.get(&request).await?;
        Ok(ByteView::from(response.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_local_load_error();
                return Err(err);
            }
        };
        self.stats.record_local_load();

        let value = ByteView::copy_from(&bytes);
        self.main_cache.add(key, value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeerResponse;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn db() -> HashMap<&'static str, &'static str> {
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
    }

    /// Loader over `db()` counting calls per key.
    #[derive(Default)]
    struct CountingLoader {
        calls: Mutex<HashMap<String, usize>>,
        delay: Option<Duration>,
    }

    impl CountingLoader {
        fn calls(&self, key: &str) -> usize {
            self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Getter for CountingLoader {
        async fn get(&self, key: &str) -> Result<Vec<u8>> {
            *self.calls.lock().unwrap().entry(key.to_string()).or_default() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            db().get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| CacheError::Load(format!("{} not exist", key)))
        }
    }

    /// Peer answering every key with a fixed value, or failing.
    struct FakePeer {
        answer: Result<Vec<u8>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PeerGetter for FakePeer {
        async fn get(&self, request: &PeerRequest) -> Result<PeerResponse> {
            assert_eq!(request.group, "scores");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().map(PeerResponse::new)
        }
    }

    /// Picks `peer` for every key.
    struct AlwaysRemote(Arc<FakePeer>);

    impl PeerPicker for AlwaysRemote {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(self.0.clone())
        }
    }

    /// Owns every key locally.
    struct AlwaysLocal;

    impl PeerPicker for AlwaysLocal {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            None
        }
    }

    fn scores(loader: Arc<CountingLoader>) -> Group {
        Group::new("scores", 2048, loader)
    }

    #[tokio::test]
    async fn test_get_loads_then_hits_cache() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());

        for (key, value) in db() {
            assert_eq!(group.get(key).await.unwrap().to_string(), value);
            assert_eq!(group.get(key).await.unwrap().to_string(), value);
            assert_eq!(loader.calls(key), 1, "cache miss for {}", key);
        }

        let snapshot = group.stats().snapshot();
        assert_eq!(snapshot.gets, 6);
        assert_eq!(snapshot.cache_hits, 3);
        assert_eq!(snapshot.local_loads, 3);
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_without_loading() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());

        assert_eq!(group.get(INVALID_KEY).await, Err(CacheError::InvalidKey));
        assert_eq!(group.get("").await, Err(CacheError::InvalidKey));
        assert_eq!(loader.calls(INVALID_KEY), 0);
        assert_eq!(loader.calls(""), 0);
    }

    #[tokio::test]
    async fn test_loader_error_propagates_and_is_not_cached() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());

        let expected = Err(CacheError::Load("unknown not exist".to_string()));
        assert_eq!(group.get("unknown").await, expected);
        assert_eq!(group.get("unknown").await, expected);

        assert_eq!(loader.calls("unknown"), 2);
        assert_eq!(group.cache_stats().await.total_entries, 0);
        assert_eq!(group.stats().snapshot().local_load_errors, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_load_once() {
        let loader = Arc::new(CountingLoader {
            delay: Some(Duration::from_millis(200)),
            ..CountingLoader::default()
        });
        let group = Arc::new(scores(loader.clone()));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("Tom").await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().to_string(), "630");
        }

        assert_eq!(loader.calls("Tom"), 1);
        let snapshot = group.stats().snapshot();
        assert_eq!(snapshot.loads, 10);
        assert_eq!(snapshot.loads_deduped, 9);
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_restart_load() {
        let loader = Arc::new(CountingLoader {
            delay: Some(Duration::from_millis(200)),
            ..CountingLoader::default()
        });
        let group = scores(loader.clone());

        let first = tokio::time::timeout(Duration::from_millis(50), group.get("Tom"));
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            group.get("Tom").await
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_err());
        assert_eq!(second.unwrap().to_string(), "630");
        assert_eq!(loader.calls("Tom"), 1);
    }

    #[tokio::test]
    async fn test_abandoned_load_still_populates_cache() {
        let loader = Arc::new(CountingLoader {
            delay: Some(Duration::from_millis(100)),
            ..CountingLoader::default()
        });
        let group = scores(loader.clone());

        let cancelled = tokio::time::timeout(Duration::from_millis(20), group.get("Jack")).await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(group.cache_stats().await.total_entries, 1);
        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(loader.calls("Jack"), 1);
        assert_eq!(group.stats().snapshot().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_register_peers_twice_is_rejected() {
        let group = scores(Arc::new(CountingLoader::default()));

        assert!(group.register_peers(Arc::new(AlwaysLocal)).is_ok());
        assert!(matches!(
            group.register_peers(Arc::new(AlwaysLocal)),
            Err(CacheError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_locally_owned_key_uses_loader() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());
        group.register_peers(Arc::new(AlwaysLocal)).unwrap();

        assert_eq!(group.get("Sam").await.unwrap().to_string(), "567");
        assert_eq!(loader.calls("Sam"), 1);
    }

    #[tokio::test]
    async fn test_remote_value_is_not_cached_locally() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());
        let peer = Arc::new(FakePeer {
            answer: Ok(b"remote-630".to_vec()),
            calls: AtomicUsize::new(0),
        });
        group.register_peers(Arc::new(AlwaysRemote(peer.clone()))).unwrap();

        assert_eq!(group.get("Tom").await.unwrap().to_string(), "remote-630");
        assert_eq!(group.get("Tom").await.unwrap().to_string(), "remote-630");

        assert_eq!(peer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.calls("Tom"), 0);
        assert_eq!(group.cache_stats().await.total_entries, 0);
        assert_eq!(group.stats().snapshot().peer_loads, 2);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_loader() {
        let loader = Arc::new(CountingLoader::default());
        let group = scores(loader.clone());
        let peer = Arc::new(FakePeer {
            answer: Err(CacheError::PeerStatus("500 Internal Server Error".to_string())),
            calls: AtomicUsize::new(0),
        });
        group.register_peers(Arc::new(AlwaysRemote(peer.clone()))).unwrap();

        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.calls("Jack"), 1);

        // the fallback result is cached, so the peer is not asked again
        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);

        let snapshot = group.stats().snapshot();
        assert_eq!(snapshot.peer_errors, 1);
        assert_eq!(snapshot.local_loads, 1);
    }

    #[tokio::test]
    async fn test_peer_and_loader_failure_surfaces_loader_error() {
        let group = scores(Arc::new(CountingLoader::default()));
        let peer = Arc::new(FakePeer {
            answer: Err(CacheError::Peer("connection refused".to_string())),
            calls: AtomicUsize::new(0),
        });
        group.register_peers(Arc::new(AlwaysRemote(peer))).unwrap();

        assert_eq!(
            group.get("nobody").await,
            Err(CacheError::Load("nobody not exist".to_string()))
        );
    }

    #[tokio::test]
    async fn test_getter_fn_adapter() {
        let group = Group::new(
            "echo",
            0,
            Arc::new(GetterFn(|key: &str| {
                Ok::<_, CacheError>(key.repeat(2).into_bytes())
            })),
        );
        assert_eq!(group.get("ab").await.unwrap().to_string(), "abab");
        assert_eq!(group.name(), "echo");
    }
}
