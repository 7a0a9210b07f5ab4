//! Numeric export data: tile records per bitmap and global-id layer cells
//!
//! Only the records the map format needs are produced here. The text writer
//! emits one `img=<path>` line per distinct bitmap followed by that bitmap's
//! `tile=id,left,top,width,height,originX,originY` lines.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use isomap_core::TileLayer;
use serde::Serialize;

use crate::allocation::GlobalAllocationTable;
use crate::binding::TilesetBindings;
use crate::IsoMapError;

/// One exported tile: a global id and its region in the source bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    pub global_id: u32,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub origin_x: u32,
    pub origin_y: u32,
}

impl fmt::Display for TileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tile={},{},{},{},{},{},{}",
            self.global_id,
            self.left,
            self.top,
            self.width,
            self.height,
            self.origin_x,
            self.origin_y
        )
    }
}

/// Tile records grouped under the bitmap path they come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportImage {
    pub path: PathBuf,
    pub records: Vec<TileRecord>,
}

/// Everything a map exporter needs from the bound tilesets
#[derive(Debug, Clone, Serialize)]
pub struct ExportPlan {
    pub table: GlobalAllocationTable,
    pub images: Vec<ExportImage>,
}

impl ExportPlan {
    /// Allocate global ids and collect the tile records of every binding
    pub fn build(bindings: &TilesetBindings) -> Self {
        let table = GlobalAllocationTable::allocate(bindings.iter());
        let mut images: Vec<ExportImage> = Vec::new();

        for entry in table.iter() {
            let Some(binding) = bindings.by_id(entry.binding_id) else {
                continue;
            };
            let records = binding.palette.iter().map(|(gid, region)| TileRecord {
                global_id: entry.offset + gid - 1,
                left: region.source_x,
                top: region.source_y,
                width: region.width,
                height: region.height,
                origin_x: region.origin_x,
                origin_y: region.origin_y,
            });

            match images.iter_mut().find(|image| image.path == entry.source_path) {
                Some(image) => image.records.extend(records),
                None => images.push(ExportImage {
                    path: entry.source_path.clone(),
                    records: records.collect(),
                }),
            }
        }

        Self { table, images }
    }

    /// Total number of tile records
    pub fn tile_count(&self) -> usize {
        self.images.iter().map(|image| image.records.len()).sum()
    }

    /// Translate a layer's palette ids to global ids, row-major.
    ///
    /// A layer with no bound tileset is accepted only if it is empty.
    pub fn layer_cells(&self, layer: &TileLayer) -> Result<Vec<u32>, IsoMapError> {
        let Some(entry) = self.table.entry_for_layer(layer.layer_type) else {
            if layer.max_gid() == 0 {
                return Ok(layer.cells().to_vec());
            }
            return Err(IsoMapError::BindingNotFound(layer.layer_type));
        };

        layer
            .cells()
            .iter()
            .map(|&gid| {
                entry.global_id(gid).ok_or(IsoMapError::UnknownTile {
                    layer_type: layer.layer_type,
                    gid,
                    count: entry.count,
                })
            })
            .collect()
    }

    /// Write the `img=` / `tile=` record lines
    pub fn write_tile_records<W: Write>(&self, out: &mut W) -> Result<(), IsoMapError> {
        for image in &self.images {
            writeln!(out, "img={}", image.path.display())?;
            for record in &image.records {
                writeln!(out, "{record}")?;
            }
        }
        Ok(())
    }
}
