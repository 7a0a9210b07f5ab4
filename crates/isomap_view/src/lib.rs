//! Isometric view math for isomap
//!
//! - [`IsometricCamera`] - Zoom and pan state, zoom clamped to `[0.1, 5.0]`
//! - [`IsometricProjector`] - Cell to screen transforms, diamond picking,
//!   viewport culling and sprite placement

mod camera;
mod projector;

pub use camera::{IsometricCamera, MAX_ZOOM, MIN_ZOOM};
pub use projector::{
    IsometricProjector, ScreenRect, TileRange, ViewSettings, DEFAULT_PICK_TOLERANCE,
};
