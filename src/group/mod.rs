//! Group Module
//!
//! A group is a named cache namespace: its own LRU store, loader and peer
//! wiring. Groups live in an explicit [`GroupRegistry`].

mod cache_group;
mod registry;
mod stats;

pub use cache_group::{Getter, GetterFn, Group, INVALID_KEY};
pub use registry::GroupRegistry;
pub use stats::{GroupStats, GroupStatsSnapshot};
