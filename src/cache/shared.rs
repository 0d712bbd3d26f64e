//! Shared Cache Module
//!
//! Thread-safe wrapper around [`LruStore`] owned by a single group.

use tokio::sync::Mutex;

use crate::cache::{ByteView, CacheStats, LruStore};

/// Locked LRU store.
///
/// The lock is held only for the map and list mutation itself, never across
/// a load or a network call. Every group owns its own instance.
#[derive(Debug)]
pub struct SharedCache {
    inner: Mutex<LruStore>,
}

impl SharedCache {
    /// Creates a cache bounded to `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self::from_store(LruStore::new(max_bytes))
    }

    /// Wraps an existing store, e.g. one carrying an eviction callback.
    pub fn from_store(store: LruStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub async fn add(&self, key: &str, value: ByteView) {
        self.inner.lock().await.add(key.to_string(), value);
    }

    pub async fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.lock().await.get(key)
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
