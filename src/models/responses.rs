//! Response models
//!
//! The peer response message and the JSON bodies of the node's API.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::group::GroupStatsSnapshot;

/// Value returned by a peer for a [`PeerRequest`](crate::models::PeerRequest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    /// The value bytes
    pub value: Vec<u8>,
}

impl PeerResponse {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }
}

/// Per-group section of the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    /// Group name
    pub name: String,
    /// Group-level load counters
    pub group: GroupStatsSnapshot,
    /// Local LRU store counters
    pub cache: CacheStats,
    /// Store hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl GroupStatsResponse {
    pub fn new(name: impl Into<String>, group: GroupStatsSnapshot, cache: CacheStats) -> Self {
        let hit_rate = cache.hit_rate();
        Self {
            name: name.into(),
            group,
            cache,
            hit_rate,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// This node's peer identifier
    pub node: String,
    /// One entry per registered group, sorted by name
    pub groups: Vec<GroupStatsResponse>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
