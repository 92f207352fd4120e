//! Decode and merge logic for packed tile-set words.
//!
//! The codec owns the overflow store its extended words point into: a
//! word's marker-as-index is a non-owning reference that is only meaningful
//! against the store of the codec that produced it.
//!
//! ```text
//!   update(original, descriptors)
//!        │
//!        ├─ original extended ──► merge with overflow entry ──► new entry
//!        │
//!        └─ original compact
//!              ├─ all offsets in the 5×5 window ──► set bitmap bits in place
//!              └─ any offset outside ──► promote: full decoded set + pending
//!                                        becomes a fresh overflow entry
//! ```

use crate::error::Result;
use crate::overflow::{OverflowStats, OverflowStore};
use crate::value::{bitmap_index, TileDescriptor, TileSet, TileSetValue, WINDOW_RADIUS};

/// Packed-word codec plus its owned overflow store.
///
/// Single-writer: [`TileSetCodec::update`] takes `&mut self`. Decoding is
/// `&self` and safe to share once no further updates occur.
#[derive(Debug, Default)]
pub struct TileSetCodec {
    overflow: OverflowStore,
}

impl TileSetCodec {
    pub fn new() -> Self {
        TileSetCodec {
            overflow: OverflowStore::new(),
        }
    }

    /// Decode a packed word into the tile set it represents.
    ///
    /// `None` is the "no entry" word, distinct from an empty set (which the
    /// codec never produces). An extended word's overflow entry usually
    /// re-contains the primary tile — it was written there at promotion —
    /// so the primary can be derived twice; the set absorbs the duplicate,
    /// and the contract is only ever a superset one.
    pub fn decode(&self, value: TileSetValue) -> Option<TileSet> {
        if value.is_absent() {
            return None;
        }
        let mut tiles = TileSet::default();
        self.decode_into(value, &mut tiles);
        Some(tiles)
    }

    /// Union of [`TileSetCodec::decode`] over a batch of words, skipping
    /// absent ones.
    pub fn decode_batch<I>(&self, values: I) -> TileSet
    where
        I: IntoIterator<Item = TileSetValue>,
    {
        let mut tiles = TileSet::default();
        for value in values {
            if !value.is_absent() {
                self.decode_into(value, &mut tiles);
            }
        }
        tiles
    }

    fn decode_into(&self, value: TileSetValue, out: &mut TileSet) {
        value.implied_tiles_into(out);
        if value.is_extended() {
            out.extend(self.overflow.get(value.marker()).iter().copied());
        } else {
            value.bitmap_tiles_into(out);
        }
    }

    /// Merge a batch of tile descriptors into an existing word.
    ///
    /// The word stays compact while every new tile fits the 5×5 bitmap
    /// window around its primary tile; otherwise it promotes to an overflow
    /// entry. Promotion is one-way: an extended word never returns to
    /// compact form.
    ///
    /// Precondition: `original` is a live word, not the "no entry" word.
    pub fn update(
        &mut self,
        original: TileSetValue,
        descriptors: &[TileDescriptor],
    ) -> Result<TileSetValue> {
        debug_assert!(!original.is_absent(), "cannot update the no-entry word");

        let mut pending = TileSet::default();
        for descriptor in descriptors {
            descriptor.expand_into(&mut pending);
        }

        if original.is_extended() {
            let mut merged = self.overflow.get(original.marker()).clone();
            merged.extend(pending.iter().copied());
            let index = self.overflow.append(merged)?;
            return Ok(original.with_overflow_index(index));
        }

        let tx = original.tile_x() as i64;
        let ty = original.tile_y() as i64;

        // If anything lands outside the window the bitmap cannot hold the
        // batch, and the untouched original promotes whole.
        let fits = pending.iter().all(|tile| {
            let dx = i64::from(tile.x()) - tx;
            let dy = i64::from(tile.y()) - ty;
            dx.abs() <= WINDOW_RADIUS && dy.abs() <= WINDOW_RADIUS
        });
        if !fits {
            return self.promote(original, pending);
        }

        let mut value = original;
        for tile in &pending {
            let dx = i64::from(tile.x()) - tx;
            let dy = i64::from(tile.y()) - ty;
            match bitmap_index(dx, dy) {
                Some(bit) => value = value.with_bitmap_bit(bit),
                // Only the center cell maps to no bit here: the primary
                // tile stays implicit.
                None => continue,
            }
        }
        Ok(value)
    }

    /// One-way compact → extended transition: the original's full decoded
    /// set and the pending tiles become a fresh overflow entry, and the
    /// marker field is repurposed as its index.
    fn promote(&mut self, original: TileSetValue, mut pending: TileSet) -> Result<TileSetValue> {
        original.implied_tiles_into(&mut pending);
        original.bitmap_tiles_into(&mut pending);
        let index = self.overflow.append(pending)?;
        tracing::trace!(
            x = original.tile_x(),
            y = original.tile_y(),
            index,
            "tile set promoted to overflow store"
        );
        Ok(original.with_overflow_index(index))
    }

    /// Read-only view of the owned overflow store.
    pub fn overflow(&self) -> &OverflowStore {
        &self.overflow
    }

    pub fn overflow_stats(&self) -> OverflowStats {
        self.overflow.stats()
    }
}
