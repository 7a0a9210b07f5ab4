//! TOML configuration for detection and view settings
//!
//! ```toml
//! [detection]
//! threshold = 10
//! min_size = 8
//! padding = 1
//! tile_size = { width = 64, height = 32 }
//!
//! [view]
//! tile_width = 64
//! tile_height = 32
//! pick_tolerance = 0.9
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use isomap_segment::DetectionSettings;
use isomap_view::{IsometricProjector, ViewSettings};
use serde::{Deserialize, Serialize};

use crate::IsoMapError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoMapConfig {
    pub detection: DetectionSettings,
    pub view: ViewSettings,
}

impl IsoMapConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, IsoMapError> {
        let config: IsoMapConfig = toml::from_str(content)
            .map_err(|e| IsoMapError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IsoMapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).inspect_err(|e| {
            log::warn!("rejected config {}: {e}", path.display());
        })
    }

    /// Serialize the config back to TOML
    pub fn to_toml_string(&self) -> Result<String, IsoMapError> {
        toml::to_string_pretty(self)
            .map_err(|e| IsoMapError::Config(format!("failed to serialize config: {e}")))
    }

    pub fn validate(&self) -> Result<(), IsoMapError> {
        self.detection.validate()?;
        self.view.tile_size().validate()?;
        let tolerance = self.view.pick_tolerance;
        if !(tolerance > 0.0 && tolerance <= 1.0) {
            return Err(IsoMapError::Config(format!(
                "pick tolerance must be in (0, 1], got {tolerance}"
            )));
        }
        Ok(())
    }

    /// Projector for the configured view
    pub fn projector(&self) -> IsometricProjector {
        IsometricProjector::from_settings(&self.view)
    }
}
