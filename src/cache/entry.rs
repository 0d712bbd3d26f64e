//! Cache Entry Module
//!
//! A stored value together with its logical size.

use crate::cache::ByteView;

// == Cache Entry ==
/// Represents a single entry in the LRU store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: ByteView,
    /// Logical size charged against the byte budget (key + value length)
    pub size: usize,
}

impl CacheEntry {
    /// Creates an entry for `key`, charging both key and value bytes.
    pub fn new(key: &str, value: ByteView) -> Self {
        let size = key.len() + value.len();
        Self { value, size }
    }
}
