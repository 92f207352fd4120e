//! Entity→tile-set map: the codec composed with a pluggable word store.
//!
//! Persistence is delegated entirely to the injected [`ValueStore`]; the
//! codec layer never initiates I/O of its own. Backends implement the two
//! word-level operations and nothing else.

use crate::codec::TileSetCodec;
use crate::config::GridConfig;
use crate::error::{Result, TileSetError};
use crate::tile_coord::TileId;
use crate::value::{Neighbours, TileDescriptor, TileSet, TileSetValue};

/// Word-level key→value storage the tile map writes through.
///
/// A stored value of 0 means "no entry"; the codec's sentinel bit
/// guarantees every live word is non-zero.
pub trait ValueStore {
    /// The stored word for `key`, or 0 when absent.
    fn get(&self, key: u64) -> u64;

    /// Persist `value` under `key`, replacing any previous word.
    fn put(&mut self, key: u64, value: u64);
}

/// Per-entity tile membership map.
///
/// Tracks, for every entity key, the packed set of grid tiles the entity
/// intersects, so a later stage can split the dataset into per-tile output
/// files. Single-writer per map; shared reads are safe once updates stop.
#[derive(Debug)]
pub struct EntityTileMap<S: ValueStore> {
    codec: TileSetCodec,
    store: S,
    grid: GridConfig,
}

impl<S: ValueStore> EntityTileMap<S> {
    pub fn new(store: S, grid: GridConfig) -> Self {
        EntityTileMap {
            codec: TileSetCodec::new(),
            store,
            grid,
        }
    }

    /// Merge a batch of tile descriptors into an entity's stored tile set.
    ///
    /// An absent entity is created from the first descriptor, with the rest
    /// merged through the codec's update path. Descriptor coordinates are
    /// validated against the grid before anything is written.
    pub fn update(&mut self, key: u64, descriptors: &[TileDescriptor]) -> Result<()> {
        for d in descriptors {
            if !self.grid.contains(d.x, d.y) {
                return Err(TileSetError::InvalidArgument(format!(
                    "tile {}/{} outside the zoom-{} grid",
                    d.x, d.y, self.grid.zoom
                )));
            }
        }
        let Some((first, rest)) = descriptors.split_first() else {
            return Ok(());
        };

        let current = TileSetValue::from_raw(self.store.get(key));
        let (seed, rest) = if current.is_absent() {
            (TileSetValue::new(first.x, first.y, first.neighbours), rest)
        } else {
            (current, descriptors)
        };

        let updated = self.codec.update(seed, rest)?;
        self.store.put(key, updated.raw());
        Ok(())
    }

    /// Merge already-linearized tile ids, carrying no neighbour information.
    pub fn update_tile_ids(&mut self, key: u64, tiles: &[TileId]) -> Result<()> {
        let descriptors: Vec<TileDescriptor> = tiles
            .iter()
            .map(|t| TileDescriptor::new(t.x(), t.y(), Neighbours::None))
            .collect();
        self.update(key, &descriptors)
    }

    /// All tiles the entity currently intersects, or `None` when the key
    /// has no entry. An empty set is never returned.
    pub fn all_tiles(&self, key: u64) -> Option<TileSet> {
        self.codec
            .decode(TileSetValue::from_raw(self.store.get(key)))
    }

    /// The codec (and through it the overflow store) for the read-only
    /// phase after the build pass.
    pub fn codec(&self) -> &TileSetCodec {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    /// Split into codec and store, e.g. to iterate stored words while
    /// decoding them for the output-writing phase.
    pub fn into_parts(self) -> (TileSetCodec, S) {
        (self.codec, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct TestStore(HashMap<u64, u64>);

    impl ValueStore for TestStore {
        fn get(&self, key: u64) -> u64 {
            self.0.get(&key).copied().unwrap_or(0)
        }

        fn put(&mut self, key: u64, value: u64) {
            self.0.insert(key, value);
        }
    }

    fn tiles_of(set: &TileSet) -> Vec<(u32, u32)> {
        let mut tiles: Vec<(u32, u32)> = set.iter().map(|t| (t.x(), t.y())).collect();
        tiles.sort_unstable();
        tiles
    }

    #[test]
    fn test_create_then_merge() {
        let mut map = EntityTileMap::new(TestStore::default(), GridConfig::default());

        map.update(7, &[TileDescriptor::new(10, 10, Neighbours::None)])
            .unwrap();
        assert_eq!(tiles_of(&map.all_tiles(7).unwrap()), vec![(10, 10)]);

        map.update(7, &[TileDescriptor::new(12, 12, Neighbours::None)])
            .unwrap();
        assert_eq!(
            tiles_of(&map.all_tiles(7).unwrap()),
            vec![(10, 10), (12, 12)]
        );
    }

    #[test]
    fn test_create_uses_first_descriptor_and_merges_rest() {
        let mut map = EntityTileMap::new(TestStore::default(), GridConfig::default());

        map.update(
            1,
            &[
                TileDescriptor::new(10, 10, Neighbours::East),
                TileDescriptor::new(11, 11, Neighbours::None),
            ],
        )
        .unwrap();

        let value = TileSetValue::from_raw(map.store().get(1));
        assert_eq!(value.tile_x(), 10);
        assert_eq!(value.tile_y(), 10);
        assert_eq!(
            tiles_of(&map.all_tiles(1).unwrap()),
            vec![(10, 10), (11, 10), (11, 11)]
        );
    }

    #[test]
    fn test_absent_key() {
        let map = EntityTileMap::new(TestStore::default(), GridConfig::default());
        assert!(map.all_tiles(99).is_none());
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let mut map = EntityTileMap::new(TestStore::default(), GridConfig::default());
        map.update(1, &[]).unwrap();
        assert!(map.all_tiles(1).is_none());
    }

    #[test]
    fn test_out_of_grid_rejected_before_write() {
        let mut map = EntityTileMap::new(TestStore::default(), GridConfig::new(4).unwrap());

        let err = map
            .update(
                1,
                &[
                    TileDescriptor::new(1, 1, Neighbours::None),
                    TileDescriptor::new(16, 0, Neighbours::None),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, TileSetError::InvalidArgument(_)));
        assert!(map.all_tiles(1).is_none(), "nothing persisted on failure");
    }

    #[test]
    fn test_update_tile_ids() {
        let mut map = EntityTileMap::new(TestStore::default(), GridConfig::default());

        let tiles = [TileId::encode(10, 10), TileId::encode(11, 10)];
        map.update_tile_ids(3, &tiles).unwrap();
        assert_eq!(
            tiles_of(&map.all_tiles(3).unwrap()),
            vec![(10, 10), (11, 10)]
        );
    }
}
