//! Sprite regions within a tileset bitmap

use serde::{Deserialize, Serialize};

use crate::{CoreError, PixelRect};

/// A sprite rectangle in a bitmap plus the anchor that sits on the tile base.
///
/// `origin_x`/`origin_y` are relative to the region's top-left corner. When a
/// sprite is drawn on a tile, its origin is placed on the tile's diamond centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub source_x: u32,
    pub source_y: u32,
    pub width: u32,
    pub height: u32,
    pub origin_x: u32,
    pub origin_y: u32,
}

impl Region {
    /// Create a region with the default ground anchor for the given tile height.
    ///
    /// The anchor is horizontally centred and lifted half a tile above the
    /// bottom edge, i.e. the centre of the diamond the sprite stands on.
    pub fn from_rect(rect: PixelRect, tile_height: u32) -> Self {
        let lift = (tile_height / 2).min(rect.height);
        Self {
            source_x: rect.x,
            source_y: rect.y,
            width: rect.width,
            height: rect.height,
            origin_x: rect.width / 2,
            origin_y: rect.height - lift,
        }
    }

    /// Override the anchor point
    pub fn with_origin(mut self, origin_x: u32, origin_y: u32) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    /// The source rectangle of this region
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.source_x, self.source_y, self.width, self.height)
    }

    /// Check the region invariants against a bitmap of the given bounds
    pub fn validate(&self, bounds: &PixelRect, min_size: u32) -> Result<(), CoreError> {
        if self.width < min_size || self.height < min_size {
            return Err(CoreError::InvalidInput(format!(
                "region {}x{} is smaller than the minimum size {min_size}",
                self.width, self.height
            )));
        }
        if !bounds.contains_rect(&self.rect()) {
            return Err(CoreError::InvalidInput(format!(
                "region at ({}, {}) size {}x{} exceeds the {}x{} bitmap",
                self.source_x, self.source_y, self.width, self.height, bounds.width, bounds.height
            )));
        }
        Ok(())
    }
}
