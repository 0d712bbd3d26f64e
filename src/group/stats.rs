//! Group Statistics
//!
//! Lock-free counters describing how a group resolves its lookups.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Live counters of a group, updated concurrently.
#[derive(Debug, Default)]
pub struct GroupStats {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    loads: AtomicU64,
    loads_executed: AtomicU64,
    local_loads: AtomicU64,
    local_load_errors: AtomicU64,
    server_requests: AtomicU64,
}

/// Point-in-time copy of [`GroupStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStatsSnapshot {
    /// Every `get`, including invalid keys
    pub gets: u64,
    /// Gets answered by the local store
    pub cache_hits: u64,
    /// Values fetched from a remote peer
    pub peer_loads: u64,
    /// Failed peer fetches (each fell back to a local load)
    pub peer_errors: u64,
    /// Gets that missed the store (loads requested)
    pub loads: u64,
    /// Loads satisfied by another caller's in-flight load
    pub loads_deduped: u64,
    /// Successful loader calls
    pub local_loads: u64,
    /// Failed loader calls
    pub local_load_errors: u64,
    /// Lookups served to remote peers
    pub server_requests: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl GroupStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_get(&self) {
        bump(&self.gets);
    }

    pub(crate) fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }

    pub(crate) fn record_peer_load(&self) {
        bump(&self.peer_loads);
    }

    pub(crate) fn record_peer_error(&self) {
        bump(&self.peer_errors);
    }

    pub(crate) fn record_load(&self) {
        bump(&self.loads);
    }

    pub(crate) fn record_load_executed(&self) {
        bump(&self.loads_executed);
    }

    pub(crate) fn record_local_load(&self) {
        bump(&self.local_loads);
    }

    pub(crate) fn record_local_load_error(&self) {
        bump(&self.local_load_errors);
    }

    pub(crate) fn record_server_request(&self) {
        bump(&self.server_requests);
    }

    pub fn snapshot(&self) -> GroupStatsSnapshot {
        let read = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let loads = read(&self.loads);
        GroupStatsSnapshot {
            gets: read(&self.gets),
            cache_hits: read(&self.cache_hits),
            peer_loads: read(&self.peer_loads),
            peer_errors: read(&self.peer_errors),
            loads,
            loads_deduped: loads.saturating_sub(read(&self.loads_executed)),
            local_loads: read(&self.local_loads),
            local_load_errors: read(&self.local_load_errors),
            server_requests: read(&self.server_requests),
        }
    }
}
