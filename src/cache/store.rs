//! Cache Store Module
//!
//! Byte-budgeted store combining HashMap storage with LRU tracking.

use std::collections::HashMap;
use std::fmt;

use crate::cache::{ByteView, CacheEntry, CacheStats, LruTracker};

/// Invoked with the key and value of every evicted entry.
pub type EvictionCallback = Box<dyn Fn(&str, &ByteView) + Send + Sync>;

// == LRU Store ==
/// LRU store bounded by the logical size of its entries.
///
/// Not synchronized; see [`SharedCache`](crate::cache::SharedCache) for the
/// locked wrapper a group holds.
pub struct LruStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Store statistics
    stats: CacheStats,
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Sum of logical sizes of live entries
    used_bytes: usize,
    on_evicted: Option<EvictionCallback>,
}

impl LruStore {
    // == Constructor ==
    /// Creates a store holding at most `max_bytes` of keys and values.
    ///
    /// A budget of 0 disables eviction.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_bytes,
            used_bytes: 0,
            on_evicted: None,
        }
    }

    /// Creates a store that reports every eviction to `callback`.
    pub fn with_eviction_callback(max_bytes: usize, callback: EvictionCallback) -> Self {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(callback);
        store
    }

    // == Add ==
    /// Inserts or replaces `key`, marks it most recently used, then evicts
    /// least recently used entries while the budget is exceeded.
    ///
    /// The last remaining entry is never evicted, so a single value larger
    /// than the whole budget is still kept.
    pub fn add(&mut self, key: String, value: ByteView) {
        let entry = CacheEntry::new(&key, value);
        self.used_bytes += entry.size;
        self.lru.touch(&key);

        if let Some(old) = self.entries.insert(key, entry) {
            self.used_bytes -= old.size;
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes && self.entries.len() > 1 {
            self.remove_oldest();
        }

        self.stats.set_occupancy(self.entries.len(), self.used_bytes);
    }

    // == Get ==
    /// Looks up `key`, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, returning it.
    pub fn remove_oldest(&mut self) -> Option<(String, ByteView)> {
        let key = self.lru.evict_oldest()?;
        let entry = self.entries.remove(&key)?;
        self.used_bytes -= entry.size;
        self.stats.record_eviction();
        self.stats.set_occupancy(self.entries.len(), self.used_bytes);

        if let Some(callback) = &self.on_evicted {
            callback(&key, &entry.value);
        }
        Some((key, entry.value))
    }

    /// Returns true if `key` is stored, without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of key and value lengths of all live entries.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl Default for LruStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for LruStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("entries", &self.entries.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("stats", &self.stats)
            .finish()
    }
}
