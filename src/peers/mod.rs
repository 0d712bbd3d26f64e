//! Peers Module
//!
//! Capabilities a group uses to reach other nodes, and their HTTP
//! implementation.
//!
//! # Components
//! - [`PeerPicker`] chooses the peer owning a key
//! - [`PeerGetter`] fetches a value from one peer
//! - [`HttpPool`] implements both roles over HTTP and serves inbound lookups

mod http_getter;
mod http_pool;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PeerRequest, PeerResponse};

pub use http_getter::HttpGetter;
pub use http_pool::{HttpPool, PoolOptions, DEFAULT_BASE_PATH};

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote peer owning `key`, or `None` when the key is owned
    /// by this node or no peers are known.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches values from a single remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse>;
}
