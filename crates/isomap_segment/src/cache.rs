//! Memoized detection results keyed by bitmap identity

use std::collections::HashMap;

use isomap_core::{Bitmap, Region};
use uuid::Uuid;

use crate::palette::{detect_regions, BrushPalette};
use crate::settings::DetectionSettings;
use crate::SegmentError;

#[derive(Debug, Clone)]
struct CacheEntry {
    settings: DetectionSettings,
    regions: Vec<Region>,
}

/// Detection results per bitmap, recomputed when the settings change
#[derive(Debug, Default)]
pub struct DetectionCache {
    entries: HashMap<Uuid, CacheEntry>,
}

impl DetectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check for a cached result for this bitmap under these settings
    pub fn contains(&self, bitmap_id: Uuid, settings: &DetectionSettings) -> bool {
        self.entries
            .get(&bitmap_id)
            .is_some_and(|entry| entry.settings == *settings)
    }

    /// Cached regions for the bitmap, running detection on a miss
    pub fn regions(
        &mut self,
        bitmap: &Bitmap,
        settings: &DetectionSettings,
    ) -> Result<&[Region], SegmentError> {
        settings.validate()?;
        let id = bitmap.id();
        if !self.contains(id, settings) {
            log::debug!("detection cache miss for bitmap {id}");
            let regions = detect_regions(bitmap, settings);
            self.entries.insert(
                id,
                CacheEntry {
                    settings: *settings,
                    regions,
                },
            );
        }
        Ok(&self.entries[&id].regions)
    }

    /// Build a palette from cached (or freshly detected) regions
    pub fn palette(
        &mut self,
        bitmap: &Bitmap,
        settings: &DetectionSettings,
    ) -> Result<BrushPalette, SegmentError> {
        let regions = self.regions(bitmap, settings)?.to_vec();
        BrushPalette::from_regions(bitmap.clone(), *settings, regions)
    }

    /// Drop the entry for one bitmap, returning whether it existed
    pub fn invalidate(&mut self, bitmap_id: Uuid) -> bool {
        self.entries.remove(&bitmap_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
