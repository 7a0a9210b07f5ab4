//! Sprite region detection for isometric tilesets
//!
//! Turns a tileset bitmap into an ordered palette of sprite regions:
//!
//! - [`PixelClassifier`] - Alpha threshold test for a single pixel
//! - [`detect_components`] - 8-connected components of opaque pixels
//! - [`classify`] - Shape heuristics choosing to keep or split a component
//! - [`split_component`] - Grid, gap and density split strategies
//! - [`BrushPalette`] - Ordered regions with merge, separate, remove and reorder
//! - [`DetectionCache`] - Per-bitmap memo of detection results
//!
//! # Example
//!
//! ```ignore
//! use isomap_core::Bitmap;
//! use isomap_segment::{BrushPalette, DetectionSettings};
//!
//! let bitmap = Bitmap::from_image(&image)?;
//! let mut palette = BrushPalette::detect(bitmap, DetectionSettings::default())?;
//! let change = palette.merge(&[1, 2])?;
//! ```

mod cache;
mod classify;
mod components;
mod palette;
mod pixel;
mod settings;
mod split;

#[cfg(test)]
mod testing;

pub use cache::DetectionCache;
pub use classify::{
    classify, classify_metrics, floor_pattern, horizontal_wall, is_horizontal_wall,
    is_vertical_wall, oversized, periodic_gaps, sparse_large, vertical_wall, Axis, ShapeMetrics,
    ShapeRule, SplitDecision, RULES,
};
pub use components::{detect_components, detect_in_rect, tight_bounds, Component};
pub use palette::{detect_regions, BrushPalette, NoOpReason, PaletteChange, PaletteSnapshot};
pub use pixel::{is_transparent, PixelClassifier};
pub use settings::{DetectionSettings, DEFAULT_MIN_SIZE, DEFAULT_PADDING, DEFAULT_THRESHOLD};
pub use split::split_component;

use isomap_core::CoreError;
use thiserror::Error;

/// Errors from detection and palette operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No region with id {0}")]
    NotFound(u32),
    #[error("Position {index} is out of range for a palette of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Core(#[from] CoreError),
}
