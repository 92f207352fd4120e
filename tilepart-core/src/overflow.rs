//! Overflow store for tile sets too large for the in-place bitmap.
//!
//! An append-only, growable collection of tile-id sets, referenced from
//! extended-form words by the low 24 marker bits. Entries are immutable
//! once appended — a merge always produces a new entry — so indices held
//! in previously written words stay valid for the life of the store.

use crate::error::{Result, TileSetError};
use crate::value::{TileSet, TILE_MARKER_MASK};

/// Starting slot count of the backing vector.
const INITIAL_CAPACITY: usize = 1000;

/// Hard ceiling on entries: half the marker address space.
///
/// Deliberately conservative. The guard exists so growth can never mint an
/// index that does not fit the 24-bit marker field; exceeding it aborts the
/// append instead of wrapping indices into previously written words.
const MAX_ENTRIES: usize = (TILE_MARKER_MASK / 2) as usize;

/// Counters describing an [`OverflowStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverflowStats {
    /// Entries currently stored.
    pub entries: usize,

    /// Appends answered by reusing the most recent entry.
    pub dedup_hits: u64,

    /// Current backing capacity in slots.
    pub capacity: usize,
}

/// Append-only store of extended tile sets.
///
/// Single-writer: `append` takes `&mut self`; shared `&self` reads are safe
/// once the build pass has finished.
#[derive(Debug)]
pub struct OverflowStore {
    sets: Vec<TileSet>,
    capacity: usize,
    max_entries: usize,
    dedup_hits: u64,
}

impl OverflowStore {
    pub fn new() -> Self {
        Self::with_limits(INITIAL_CAPACITY, MAX_ENTRIES)
    }

    /// Reduced limits for capacity-guard tests. Production code always goes
    /// through [`OverflowStore::new`]; the guard bound is fixed policy.
    pub(crate) fn with_limits(initial: usize, max_entries: usize) -> Self {
        OverflowStore {
            sets: Vec::with_capacity(initial),
            capacity: initial,
            max_entries,
            dedup_hits: 0,
        }
    }

    /// Append a tile set, returning the index extended words refer to it by.
    ///
    /// If the set is structurally equal to the most recently appended entry,
    /// that entry's index is returned instead of appending. Entities are
    /// processed in spatial sequence, so identical nearby clusters repeat
    /// back-to-back, and this last-entry check catches most of the
    /// duplication at O(1) cost. It is not a full dedup index: the same set
    /// appended non-consecutively gets a fresh entry.
    pub fn append(&mut self, set: TileSet) -> Result<u32> {
        if set.is_empty() {
            return Err(TileSetError::InvalidArgument(
                "overflow entries must contain at least one tile".into(),
            ));
        }

        if let Some(last) = self.sets.last() {
            if *last == set {
                self.dedup_hits += 1;
                return Ok((self.sets.len() - 1) as u32);
            }
        }

        if self.sets.len() == self.capacity {
            self.grow()?;
        }

        let index = self.sets.len() as u32;
        self.sets.push(set);
        Ok(index)
    }

    fn grow(&mut self) -> Result<()> {
        if self.capacity >= self.max_entries {
            return Err(TileSetError::CapacityExceeded {
                entries: self.sets.len(),
                limit: self.max_entries,
            });
        }
        self.capacity *= 2;
        self.sets.reserve_exact(self.capacity - self.sets.len());
        tracing::debug!(
            capacity = self.capacity,
            entries = self.sets.len(),
            "overflow store grown"
        );
        Ok(())
    }

    /// The entry at `index`.
    ///
    /// Indices are handed out by [`OverflowStore::append`] and stay valid
    /// for the store's lifetime; there is no removal or in-place update.
    pub fn get(&self, index: u32) -> &TileSet {
        &self.sets[index as usize]
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn stats(&self) -> OverflowStats {
        OverflowStats {
            entries: self.sets.len(),
            dedup_hits: self.dedup_hits,
            capacity: self.capacity,
        }
    }
}

impl Default for OverflowStore {
    fn default() -> Self {
        Self::new()
    }
}
