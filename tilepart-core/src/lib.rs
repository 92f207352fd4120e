//! Packed per-entity tile-set tracking for splitting planet-scale
//! geospatial datasets into per-tile outputs.
//!
//! Every entity's tile membership lives in a single 64-bit word: the
//! primary tile in the high bits, up to 24 nearby tiles as an in-place
//! bitmap over a 5×5 window, and an escape into a growable overflow store
//! for the rare entity that spans more. Hundreds of millions of entities
//! get one word each, so the compact form carries almost all of the data
//! and the overflow store stays small.
//!
//! ```text
//! ┌───────────────────────────── EntityTileMap ─────────────────────────────┐
//! │  ValueStore (injected)        TileSetCodec            OverflowStore     │
//! │  key → packed u64      ◄──►   decode / update   ──►   extended entries  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tile_coord`]: tile (x, y) ↔ linearized [`TileId`]
//! - [`value`]: the 64-bit word layout and the bitmap index mapping
//! - [`overflow`]: the append-only extended-set store
//! - [`codec`]: decode and the merge/promotion algorithm
//! - [`store`]: the [`ValueStore`] capability and the entity map on top
//! - [`config`]: output grid configuration
//! - [`error`]: error types

pub mod codec;
pub mod config;
pub mod error;
pub mod overflow;
pub mod store;
pub mod tile_coord;
pub mod value;

pub use codec::TileSetCodec;
pub use config::GridConfig;
pub use error::{Result, TileSetError};
pub use overflow::{OverflowStats, OverflowStore};
pub use store::{EntityTileMap, ValueStore};
pub use tile_coord::{TileId, MAX_TILE_NUMBER};
pub use value::{Neighbours, TileDescriptor, TileSet, TileSetValue, TILE_MARKER_MASK};
