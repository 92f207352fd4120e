//! In-memory value store for the entity tile map.
//!
//! Backs [`tilepart_core::ValueStore`] with a hash map, for build passes
//! where the whole entity→word mapping fits in RAM. Pre-size with
//! [`MemoryValueStore::with_capacity`] when the entity count is known up
//! front to avoid rehashing mid-pass.

use hashbrown::HashMap;
use tilepart_core::ValueStore;

/// Hash-map backed word store.
#[derive(Debug, Default)]
pub struct MemoryValueStore {
    words: HashMap<u64, u64>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for an expected entity count.
    pub fn with_capacity(entities: usize) -> Self {
        MemoryValueStore {
            words: HashMap::with_capacity(entities),
        }
    }

    /// Number of entities with an entry.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate stored `(key, packed word)` pairs, e.g. for the per-tile
    /// output phase. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.words.iter().map(|(&key, &word)| (key, word))
    }
}

impl ValueStore for MemoryValueStore {
    fn get(&self, key: u64) -> u64 {
        self.words.get(&key).copied().unwrap_or(0)
    }

    fn put(&mut self, key: u64, value: u64) {
        self.words.insert(key, value);
    }
}
