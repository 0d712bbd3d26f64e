//! Cache Module
//!
//! Provides the byte-budgeted LRU store each group keeps locally, and the
//! immutable value view handed to callers.

mod byte_view;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use byte_view::ByteView;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::{EvictionCallback, LruStore};
