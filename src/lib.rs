//! Group Cache - A distributed in-memory cache
//!
//! Each node keeps a byte-bounded LRU cache per named group. On a miss, the
//! node asks the peer that owns the key on a consistent hash ring, or runs
//! the group's loader itself; concurrent misses for one key share a single
//! load.

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
pub use peers::{HttpPool, PeerGetter, PeerPicker, PoolOptions};
