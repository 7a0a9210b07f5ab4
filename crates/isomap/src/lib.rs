//! isomap - isometric map authoring core
//!
//! Ties the sprite detection and view crates together around per-layer
//! tileset bindings:
//!
//! - [`TilesetBindings`] - At most one tileset (bitmap + brush palette) per layer type
//! - [`GlobalAllocationTable`] - One shared id namespace across all bound tilesets
//! - [`ExportPlan`] - Region records and global-id layer cells for map export
//! - [`IsoMapConfig`] - Detection and view settings loaded from TOML
//!
//! # Example
//!
//! ```ignore
//! use isomap::{IsoMapConfig, TilesetBindings, ExportPlan};
//! use isomap::types::{LayerType, TilesetGeometry};
//!
//! let config = IsoMapConfig::load("isomap.toml")?;
//! let mut bindings = TilesetBindings::new();
//! bindings.bind(LayerType::Object, bitmap, geometry, "tiles/trees.png", config.detection)?;
//!
//! let plan = ExportPlan::build(&bindings);
//! let mut out = Vec::new();
//! plan.write_tile_records(&mut out)?;
//! ```

mod allocation;
mod binding;
mod config;
mod export;

pub use allocation::{AllocationEntry, GlobalAllocationTable};
pub use binding::{LayerTilesetBinding, TilesetBindings};
pub use config::IsoMapConfig;
pub use export::{ExportImage, ExportPlan, TileRecord};

/// Re-export the member crates
pub mod types {
    pub use isomap_core::*;
}

pub mod segment {
    pub use isomap_segment::*;
}

pub mod view {
    pub use isomap_view::*;
}

use isomap_core::{CoreError, LayerType};
use isomap_segment::SegmentError;
use thiserror::Error;

/// Errors from binding, export and configuration
#[derive(Debug, Error)]
pub enum IsoMapError {
    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No tileset is bound to the {} layer", .0.name())]
    BindingNotFound(LayerType),

    #[error("Tile {gid} on the {} layer is outside its palette of {count}", .layer_type.name())]
    UnknownTile {
        layer_type: LayerType,
        gid: u32,
        count: u32,
    },
}
