//! Consistent Hash Ring
//!
//! Maps keys to peers using virtual nodes on a 32-bit hash ring.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hash function placing both virtual nodes and keys on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Default number of virtual nodes per peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// CRC-32 (IEEE), so every node computes identical placements.
pub fn default_hash() -> HashFn {
    Arc::new(crc32fast::hash)
}

// == Hash Ring ==
/// Consistent hash ring with `replicas` virtual nodes per peer.
///
/// Virtual node `i` of peer `p` sits at `hash(format!("{i}{p}"))`. A key is
/// owned by the first virtual node at or after the key's hash, wrapping
/// around to the first position.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted ring positions
    positions: Vec<u32>,
    /// Position -> peer identifier
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring. Uses [`default_hash`] when `hash` is `None`.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(default_hash),
            replicas,
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Places `replicas` virtual nodes for every peer, then re-sorts.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.positions.push(position);
                self.owners.insert(position, peer.to_string());
            }
        }
        self.positions.sort_unstable();
    }

    /// Returns the peer owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&p| p < hash);
        let position = self.positions[idx % self.positions.len()];
        self.owners.get(&position).map(String::as_str)
    }

    /// Number of ring positions (virtual nodes).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .finish()
    }
}
