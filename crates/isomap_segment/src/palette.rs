//! Brush palettes: the ordered, renumbered sprite regions of one tileset
//!
//! A palette id (GID) is the 1-based position of a region in the palette, so
//! ids are always exactly `1..=len()`. Every operation that changes the order
//! builds the new region list on the side and swaps it in only once it is
//! complete, returning the [`GidRemap`] from old ids to new ones.

use isomap_core::{Bitmap, GidRemap, PixelRect, Region, TilesetGeometry};
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::components::{detect_components, detect_in_rect};
use crate::pixel::PixelClassifier;
use crate::settings::DetectionSettings;
use crate::split::split_component;
use crate::SegmentError;

/// Why a palette operation left the palette untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// Merge needs at least two distinct ids
    TooFewIds,
    /// The region contains at most one component
    NothingToSeparate,
    /// Reorder source and destination are the same
    SamePosition,
}

/// Result of a palette operation that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteChange {
    Unchanged(NoOpReason),
    Renumbered(GidRemap),
}

impl PaletteChange {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, PaletteChange::Unchanged(_))
    }

    /// The id mapping if the palette changed
    pub fn remap(&self) -> Option<&GidRemap> {
        match self {
            PaletteChange::Renumbered(remap) => Some(remap),
            PaletteChange::Unchanged(_) => None,
        }
    }
}

/// Serializable copy of a palette's regions, for undo history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSnapshot {
    pub regions: Vec<Region>,
}

/// Run detection, classification and splitting over a whole bitmap
pub fn detect_regions(bitmap: &Bitmap, settings: &DetectionSettings) -> Vec<Region> {
    let area = bitmap.rect();
    let tile = settings.tile_size;
    detect_components(bitmap, settings)
        .iter()
        .flat_map(|component| {
            let decision = classify(component, &tile);
            split_component(component, decision, &area, settings)
        })
        .map(|rect| Region::from_rect(rect, tile.height))
        .collect()
}

/// The sprite regions of one tileset bitmap, addressed by 1-based id
#[derive(Debug, Clone)]
pub struct BrushPalette {
    bitmap: Bitmap,
    settings: DetectionSettings,
    regions: Vec<Region>,
}

impl BrushPalette {
    /// Create an empty palette for a bitmap
    pub fn empty(bitmap: Bitmap, settings: DetectionSettings) -> Self {
        Self {
            bitmap,
            settings,
            regions: Vec::new(),
        }
    }

    /// Detect sprite regions in the bitmap; ids follow scan order
    pub fn detect(bitmap: Bitmap, settings: DetectionSettings) -> Result<Self, SegmentError> {
        settings.validate()?;
        let regions = detect_regions(&bitmap, &settings);
        log::debug!(
            "palette for bitmap {} detected {} regions",
            bitmap.id(),
            regions.len()
        );
        Ok(Self {
            bitmap,
            settings,
            regions,
        })
    }

    /// Build a palette from known regions, checking each lies in the bitmap
    pub fn from_regions(
        bitmap: Bitmap,
        settings: DetectionSettings,
        regions: Vec<Region>,
    ) -> Result<Self, SegmentError> {
        settings.validate()?;
        let bounds = bitmap.rect();
        for region in &regions {
            region.validate(&bounds, 1)?;
        }
        Ok(Self {
            bitmap,
            settings,
            regions,
        })
    }

    /// Slice the bitmap on a uniform grid, skipping fully transparent cells
    pub fn from_grid(
        bitmap: Bitmap,
        settings: DetectionSettings,
        geometry: &TilesetGeometry,
    ) -> Result<Self, SegmentError> {
        settings.validate()?;
        geometry.tile_size().validate()?;
        let bounds = bitmap.rect();
        let classifier = PixelClassifier::new(settings.threshold);

        let regions = (0..geometry.tile_count())
            .filter_map(|index| geometry.cell_rect(index))
            .filter(|rect| bounds.contains_rect(rect))
            .filter(|rect| {
                (rect.y..rect.bottom())
                    .any(|y| (rect.x..rect.right()).any(|x| classifier.is_opaque(&bitmap, x, y)))
            })
            .map(|rect| Region::from_rect(rect, geometry.tile_height))
            .collect();

        Ok(Self {
            bitmap,
            settings,
            regions,
        })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in id order (`regions()[0]` has id 1)
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Get the region with the given id
    pub fn get(&self, gid: u32) -> Option<&Region> {
        let idx = (gid as usize).checked_sub(1)?;
        self.regions.get(idx)
    }

    pub fn contains(&self, gid: u32) -> bool {
        self.get(gid).is_some()
    }

    /// Iterate over `(gid, region)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Region)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, region)| (i as u32 + 1, region))
    }

    /// Id of the topmost region containing a bitmap pixel
    pub fn region_at(&self, x: u32, y: u32) -> Option<u32> {
        self.iter()
            .filter(|(_, region)| region.rect().contains(x, y))
            .map(|(gid, _)| gid)
            .last()
    }

    /// Append a hand-drawn region, returning its id
    pub fn push(&mut self, region: Region) -> Result<u32, SegmentError> {
        region.validate(&self.bitmap.rect(), self.settings.min_size)?;
        self.regions.push(region);
        Ok(self.regions.len() as u32)
    }

    /// Replace all regions with a fresh detection under new settings
    pub fn redetect(&mut self, settings: DetectionSettings) -> Result<usize, SegmentError> {
        settings.validate()?;
        self.regions = detect_regions(&self.bitmap, &settings);
        self.settings = settings;
        Ok(self.regions.len())
    }

    fn position(&self, gid: u32) -> Result<usize, SegmentError> {
        if self.contains(gid) {
            Ok(gid as usize - 1)
        } else {
            Err(SegmentError::NotFound(gid))
        }
    }

    fn commit(&mut self, regions: Vec<Region>, targets: Vec<u32>) -> PaletteChange {
        self.regions = regions;
        PaletteChange::Renumbered(GidRemap::new(targets))
    }

    /// Merge regions into their union bounds.
    ///
    /// The merged region takes the place of the earliest selected entry and
    /// the other selected entries are removed.
    pub fn merge(&mut self, ids: &[u32]) -> Result<PaletteChange, SegmentError> {
        let mut unique: Vec<u32> = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() < 2 {
            return Ok(PaletteChange::Unchanged(NoOpReason::TooFewIds));
        }
        let positions = unique
            .iter()
            .map(|&gid| self.position(gid))
            .collect::<Result<Vec<_>, _>>()?;

        let first = positions[0];
        let union = positions[1..]
            .iter()
            .fold(self.regions[first].rect(), |acc, &pos| {
                acc.union(&self.regions[pos].rect())
            });
        let merged = Region::from_rect(union, self.settings.tile_size.height);

        let mut next = Vec::with_capacity(self.regions.len() - positions.len() + 1);
        let mut targets = Vec::with_capacity(self.regions.len());
        let merged_gid = first as u32 + 1;
        for (i, region) in self.regions.iter().enumerate() {
            if i == first {
                next.push(merged);
                targets.push(merged_gid);
            } else if positions.contains(&i) {
                targets.push(merged_gid);
            } else {
                next.push(*region);
                targets.push(next.len() as u32);
            }
        }

        log::debug!("merged {} regions into id {}", positions.len(), merged_gid);
        Ok(self.commit(next, targets))
    }

    /// Split one region into the components detected inside it
    pub fn separate(&mut self, gid: u32) -> Result<PaletteChange, SegmentError> {
        let pos = self.position(gid)?;
        let rect = self.regions[pos].rect();
        let parts = detect_in_rect(&self.bitmap, rect, &self.settings);
        if parts.len() <= 1 {
            return Ok(PaletteChange::Unchanged(NoOpReason::NothingToSeparate));
        }

        let tile_height = self.settings.tile_size.height;
        let added = parts.len() as u32 - 1;
        let mut next = Vec::with_capacity(self.regions.len() + added as usize);
        next.extend_from_slice(&self.regions[..pos]);
        next.extend(parts.iter().map(|c| Region::from_rect(c.bounds, tile_height)));
        next.extend_from_slice(&self.regions[pos + 1..]);

        let targets = (1..=self.regions.len() as u32)
            .map(|old| if old <= gid { old } else { old + added })
            .collect();

        log::debug!("separated id {} into {} regions", gid, parts.len());
        Ok(self.commit(next, targets))
    }

    /// Delete one region; later ids shift down by one
    pub fn remove(&mut self, gid: u32) -> Result<PaletteChange, SegmentError> {
        let pos = self.position(gid)?;
        let mut next = self.regions.clone();
        next.remove(pos);

        let targets = (1..=self.regions.len() as u32)
            .map(|old| match old.cmp(&gid) {
                std::cmp::Ordering::Less => old,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => old - 1,
            })
            .collect();
        Ok(self.commit(next, targets))
    }

    /// Move the entry at 0-based position `from` to position `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<PaletteChange, SegmentError> {
        let len = self.regions.len();
        for index in [from, to] {
            if index >= len {
                return Err(SegmentError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(PaletteChange::Unchanged(NoOpReason::SamePosition));
        }

        let mut order: Vec<usize> = (0..len).collect();
        let moved = order.remove(from);
        order.insert(to, moved);

        let next = order.iter().map(|&old| self.regions[old]).collect();
        let mut targets = vec![0u32; len];
        for (new_pos, &old) in order.iter().enumerate() {
            targets[old] = new_pos as u32 + 1;
        }
        Ok(self.commit(next, targets))
    }

    /// Copy the current regions for later [`restore`](Self::restore)
    pub fn snapshot(&self) -> PaletteSnapshot {
        PaletteSnapshot {
            regions: self.regions.clone(),
        }
    }

    /// Replace the regions with a snapshot; the palette is unchanged on error
    pub fn restore(&mut self, snapshot: PaletteSnapshot) -> Result<(), SegmentError> {
        let bounds: PixelRect = self.bitmap.rect();
        for region in &snapshot.regions {
            region.validate(&bounds, 1)?;
        }
        self.regions = snapshot.regions;
        Ok(())
    }
}
