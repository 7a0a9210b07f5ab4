//! Detection settings shared by the whole segmentation pipeline

use isomap_core::TileSize;
use serde::{Deserialize, Serialize};

use crate::SegmentError;

/// Default alpha threshold: pixels at or below this alpha are transparent
pub const DEFAULT_THRESHOLD: u8 = 10;
/// Default minimum side length of a detected region
pub const DEFAULT_MIN_SIZE: u32 = 8;
/// Default padding added around every detected region
pub const DEFAULT_PADDING: u32 = 1;

/// Settings for sprite detection on one bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Alpha at or below which a pixel counts as transparent
    pub threshold: u8,
    /// Regions with a side (or opaque pixel count) below this are noise
    pub min_size: u32,
    /// Padding added around each region's tight bounds
    pub padding: u32,
    /// Base isometric tile size used by the shape heuristics
    pub tile_size: TileSize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_size: DEFAULT_MIN_SIZE,
            padding: DEFAULT_PADDING,
            tile_size: TileSize::default(),
        }
    }
}

impl DetectionSettings {
    /// Build settings from raw shell input, rejecting out-of-range values
    pub fn new(threshold: i32, min_size: i32, tile_size: TileSize) -> Result<Self, SegmentError> {
        let threshold = u8::try_from(threshold).map_err(|_| {
            SegmentError::InvalidInput(format!("threshold must be in 0..=255, got {threshold}"))
        })?;
        let min_size = u32::try_from(min_size).map_err(|_| {
            SegmentError::InvalidInput(format!("minimum size must be positive, got {min_size}"))
        })?;
        let settings = Self {
            threshold,
            min_size,
            padding: DEFAULT_PADDING,
            tile_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_tile_size(mut self, tile_size: TileSize) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Check that the settings can drive a detection run
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.min_size == 0 {
            return Err(SegmentError::InvalidInput(
                "minimum size must be at least 1".to_string(),
            ));
        }
        self.tile_size.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_input() {
        let tile = TileSize::new(64, 32);
        assert!(DetectionSettings::new(10, 8, tile).is_ok());
        assert!(matches!(
            DetectionSettings::new(300, 8, tile),
            Err(SegmentError::InvalidInput(_))
        ));
        assert!(DetectionSettings::new(-1, 8, tile).is_err());
        assert!(DetectionSettings::new(10, -4, tile).is_err());
        assert!(DetectionSettings::new(10, 0, tile).is_err());
        assert!(DetectionSettings::new(10, 8, TileSize::new(0, 32)).is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let settings: DetectionSettings = serde_json::from_str(r#"{ "threshold": 40 }"#).unwrap();
        assert_eq!(settings.threshold, 40);
        assert_eq!(settings.min_size, DEFAULT_MIN_SIZE);
        assert_eq!(settings.padding, DEFAULT_PADDING);
    }
}
