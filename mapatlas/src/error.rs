//! Error types for the tile pyramid engine.
//!
//! Every variant names the invariant that failed. None of them are
//! recoverable: callers are expected to abort the whole conversion job.

use thiserror::Error;

use crate::bounds::Bounds;

/// Result type for atlas operations.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Errors raised by the bounds algebra, the tree and the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    /// Center coordinates are not multiples of 8 or lie out of range.
    #[error("Invalid coordinate ({x}, {z}): centers must be multiples of 8 within ±2^30")]
    InvalidCoordinate { x: i32, z: i32 },

    /// Scale outside the supported range.
    #[error("Invalid scale {0}: must be between 0 and 4")]
    InvalidScale(u8),

    /// A layer was added to a stack covering a different region.
    #[error("Layer {layer} does not match stack {stack}")]
    StackMismatch { stack: Bounds, layer: Bounds },

    /// A tile reached a node that neither equals nor contains it.
    #[error("Tile {tile} does not belong under node {node}")]
    Misplaced { node: Bounds, tile: Bounds },

    /// Attempted to subdivide a finest-scale region.
    #[error("Cannot subdivide {0}: already at scale 0")]
    LeafSubdivision(Bounds),

    /// A view outlived the stack it was derived from.
    #[error("View {0} lost its parent stack")]
    DetachedView(Bounds),

    /// Tile image has the wrong dimensions.
    #[error("Invalid tile size {width}×{height}: expected 128×128")]
    InvalidTileSize { width: u32, height: u32 },

    /// Color index buffer has the wrong length.
    #[error("Invalid color index buffer of {len} bytes: expected 16384")]
    InvalidIndexCount { len: usize },
}
