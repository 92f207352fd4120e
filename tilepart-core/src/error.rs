//! Error types for the tile-set codec and overflow store.

use thiserror::Error;

/// Tile-set codec errors.
///
/// There are no transient failure modes at this layer: every variant is
/// either a programmer error or an unrecoverable capacity condition, and is
/// surfaced immediately to the caller.
#[derive(Error, Debug)]
pub enum TileSetError {
    /// The overflow store would need to grow past its guarded bound.
    ///
    /// Fatal: growing further could mint indices that no longer fit the
    /// 24-bit marker field, corrupting previously written values. The
    /// operation must abort rather than wrap or truncate.
    #[error("overflow store full: {entries} entries (guarded limit {limit})")]
    CapacityExceeded { entries: usize, limit: usize },

    /// A caller violated a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for tile-set operations.
pub type Result<T> = std::result::Result<T, TileSetError>;
