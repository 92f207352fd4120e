//! Packed tile-set word layout and the in-place bitmap mapping.
//!
//! One 64-bit word per entity records the set of tiles the entity
//! intersects. Most entities touch one or two adjacent tiles, so the word
//! keeps the common case inline and spills to the overflow store only when
//! the set outgrows the in-place bitmap.
//!
//! ## Word layout
//!
//! This layout is a de facto persistence format whenever the backing store
//! writes words to disk; it must stay bit-for-bit stable.
//!
//! | bits  | field      | meaning                                            |
//! |-------|------------|----------------------------------------------------|
//! | 48–63 | x          | primary tile column                                |
//! | 32–47 | y          | primary tile row                                   |
//! | 31    | sentinel   | always 1; keeps every live word non-zero           |
//! | 28–30 | reserved   | always 0                                           |
//! | 25–26 | neighbours | 00 none / 01 east / 10 south / 11 south-east       |
//! | 24    | extended   | marker holds an overflow index instead of a bitmap |
//! | 0–23  | marker     | relative-position bitmap, or overflow store index  |
//!
//! ## Bitmap mapping
//!
//! Compact words address a 5×5 window centered on the primary tile
//! (offsets −2..=2 on both axes). The center cell is the primary itself and
//! is never stored, which compacts the remaining 24 cells onto bit indices
//! 0..=23 by skipping slot 12:
//!
//! ```text
//!  dy\dx  -2 -1  0  1  2
//!   -2     0  1  2  3  4
//!   -1     5  6  7  8  9
//!    0    10 11  .  12 13
//!    1    14 15 16 17 18
//!    2    19 20 21 22 23
//! ```

use crate::tile_coord::{TileId, MAX_TILE_NUMBER};
use rustc_hash::FxHashSet;

/// Set of linearized tile ids.
pub type TileSet = FxHashSet<TileId>;

const TILE_X_SHIFT: u32 = 48;
const TILE_Y_SHIFT: u32 = 32;

const SENTINEL_MASK: u64 = 1 << 31;

const NEIGHBOUR_SHIFT: u32 = 25;

const EXTENDED_MASK: u64 = 1 << 24;

/// Low 24 bits of a word: relative bitmap or overflow index.
pub const TILE_MARKER_MASK: u64 = 0xFF_FFFF;

/// Half-width of the in-place bitmap window.
pub(crate) const WINDOW_RADIUS: i64 = 2;

const WINDOW_SIDE: i64 = 2 * WINDOW_RADIUS + 1;
const CENTER_SLOT: i64 = (WINDOW_SIDE * WINDOW_SIDE - 1) / 2;

/// Neighbour tiles an entity also touches, relative to its primary tile.
///
/// A 2-bit code, not a pair of independent flags: [`Neighbours::SouthEast`]
/// is its own combined encoding and implies both east and south.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Neighbours {
    None = 0b00,
    East = 0b01,
    South = 0b10,
    SouthEast = 0b11,
}

impl Neighbours {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0b01 => Neighbours::East,
            0b10 => Neighbours::South,
            0b11 => Neighbours::SouthEast,
            _ => Neighbours::None,
        }
    }

    /// The east neighbour is touched.
    pub fn has_east(self) -> bool {
        matches!(self, Neighbours::East | Neighbours::SouthEast)
    }

    /// The south neighbour is touched.
    pub fn has_south(self) -> bool {
        matches!(self, Neighbours::South | Neighbours::SouthEast)
    }
}

/// A tile an entity touches, plus cheaply encoded adjacent neighbours.
///
/// Plain `Copy` data so descriptor batches can live in contiguous slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDescriptor {
    pub x: u32,
    pub y: u32,
    pub neighbours: Neighbours,
}

impl TileDescriptor {
    pub fn new(x: u32, y: u32, neighbours: Neighbours) -> Self {
        TileDescriptor { x, y, neighbours }
    }

    /// Expand into the implied tile ids: the tile itself plus any
    /// neighbour-coded tiles.
    pub fn expand_into(&self, out: &mut TileSet) {
        out.insert(TileId::encode(self.x, self.y));
        if self.neighbours.has_east() {
            out.insert(TileId::encode(self.x + 1, self.y));
        }
        if self.neighbours.has_south() {
            out.insert(TileId::encode(self.x, self.y + 1));
        }
        if self.neighbours == Neighbours::SouthEast {
            out.insert(TileId::encode(self.x + 1, self.y + 1));
        }
    }
}

/// One entity's packed tile-set word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TileSetValue(u64);

impl TileSetValue {
    /// The all-zero "no entry" word.
    pub const ABSENT: TileSetValue = TileSetValue(0);

    /// Build a fresh word: empty marker, compact form, sentinel set.
    ///
    /// Precondition: `x` and `y` fit the 16-bit coordinate width.
    pub fn new(x: u32, y: u32, neighbours: Neighbours) -> Self {
        debug_assert!(x <= MAX_TILE_NUMBER, "tile x {x} exceeds coordinate width");
        debug_assert!(y <= MAX_TILE_NUMBER, "tile y {y} exceeds coordinate width");
        TileSetValue(
            (x as u64) << TILE_X_SHIFT
                | (y as u64) << TILE_Y_SHIFT
                | (neighbours as u64) << NEIGHBOUR_SHIFT
                | SENTINEL_MASK,
        )
    }

    /// Reinterpret a stored word.
    pub fn from_raw(raw: u64) -> Self {
        TileSetValue(raw)
    }

    /// The stored representation.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// True only for the "no entry" word. The sentinel bit guarantees no
    /// codec-produced word is ever zero.
    pub fn is_absent(self) -> bool {
        self.0 == 0
    }

    /// Primary tile column.
    pub fn tile_x(self) -> u32 {
        (self.0 >> TILE_X_SHIFT) as u32 & MAX_TILE_NUMBER
    }

    /// Primary tile row.
    pub fn tile_y(self) -> u32 {
        (self.0 >> TILE_Y_SHIFT) as u32 & MAX_TILE_NUMBER
    }

    /// Neighbour code of the primary tile.
    pub fn neighbours(self) -> Neighbours {
        Neighbours::from_bits(self.0 >> NEIGHBOUR_SHIFT)
    }

    /// Whether the marker field is an overflow-store index.
    pub fn is_extended(self) -> bool {
        self.0 & EXTENDED_MASK != 0
    }

    /// Low 24 bits: bitmap when compact, overflow index when extended.
    pub fn marker(self) -> u32 {
        (self.0 & TILE_MARKER_MASK) as u32
    }

    /// Repurpose the marker field as an overflow index, setting the
    /// extended flag. The previous marker contents are overwritten whole.
    pub(crate) fn with_overflow_index(self, index: u32) -> Self {
        debug_assert!(u64::from(index) <= TILE_MARKER_MASK);
        TileSetValue(self.0 & !TILE_MARKER_MASK | EXTENDED_MASK | u64::from(index))
    }

    pub(crate) fn with_bitmap_bit(self, bit: u32) -> Self {
        debug_assert!(bit < 24);
        TileSetValue(self.0 | 1 << bit)
    }

    /// Primary tile plus neighbour-coded tiles.
    pub(crate) fn implied_tiles_into(self, out: &mut TileSet) {
        let (x, y) = (self.tile_x(), self.tile_y());
        let neighbours = self.neighbours();
        out.insert(TileId::encode(x, y));
        if neighbours.has_east() {
            out.insert(TileId::encode(x + 1, y));
        }
        if neighbours.has_south() {
            out.insert(TileId::encode(x, y + 1));
        }
        if neighbours == Neighbours::SouthEast {
            out.insert(TileId::encode(x + 1, y + 1));
        }
    }

    /// Decode the compact marker bitmap. Only meaningful when
    /// `!is_extended()`; callers check the flag first.
    pub(crate) fn bitmap_tiles_into(self, out: &mut TileSet) {
        let (x, y) = (self.tile_x() as i64, self.tile_y() as i64);
        for bit in 0..24 {
            if self.0 >> bit & 1 == 0 {
                continue;
            }
            let (dx, dy) = bitmap_offset(bit);
            out.insert(TileId::encode((x + dx) as u32, (y + dy) as u32));
        }
    }
}

/// Map a window offset to its marker bit.
///
/// `None` for offsets outside the 5×5 window and for the center cell (the
/// primary tile, which is never stored).
pub(crate) fn bitmap_index(dx: i64, dy: i64) -> Option<u32> {
    if dx.abs() > WINDOW_RADIUS || dy.abs() > WINDOW_RADIUS || (dx == 0 && dy == 0) {
        return None;
    }
    let mut raw = (dy + WINDOW_RADIUS) * WINDOW_SIDE + (dx + WINDOW_RADIUS);
    if raw > CENTER_SLOT {
        raw -= 1;
    }
    Some(raw as u32)
}

/// Inverse of [`bitmap_index`]: marker bit back to its window offset.
pub(crate) fn bitmap_offset(bit: u32) -> (i64, i64) {
    debug_assert!(bit < 24);
    let v = if i64::from(bit) >= CENTER_SLOT {
        i64::from(bit) + 1
    } else {
        i64::from(bit)
    };
    (v % WINDOW_SIDE - WINDOW_RADIUS, v / WINDOW_SIDE - WINDOW_RADIUS)
}
