//! Core data structures for isomap
//!
//! This crate provides the fundamental types shared by the segmentation engine,
//! the isometric view and the export layer:
//! - `Bitmap` - Immutable, cheaply shared RGBA pixel buffer
//! - `PixelRect` / `Region` - Rectangles in bitmap space, with sprite anchors
//! - `TileSize` / `TilesetGeometry` - Base tile dimensions and grid metadata
//! - `LayerType` - Closed set of map layer kinds with their export priority
//! - `TileLayer` - Grid of palette-local tile ids (0 = empty)
//! - `GidRemap` - Old-to-new id mapping produced when a palette renumbers

mod bitmap;
mod geometry;
mod layer;
mod region;

pub use bitmap::Bitmap;
pub use geometry::{PixelRect, TileSize, TilesetGeometry};
pub use layer::{GidRemap, LayerType, TileLayer};
pub use region::Region;

use thiserror::Error;

/// Errors raised when core data is constructed or accessed with bad input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Cell ({x}, {y}) is outside the {width}x{height} layer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}
