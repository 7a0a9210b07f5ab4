//! Rectangles, tile sizes and tileset grid geometry

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// An axis-aligned rectangle in bitmap pixel space.
///
/// `x`/`y` are inclusive, `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from inclusive min/max pixel coordinates
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a pixel lies inside this rectangle
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Check if `other` lies fully inside this rectangle
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PixelRect::new(x, y, right - x, bottom - y)
    }

    /// Overlapping part of both rectangles, if any
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(PixelRect::new(x, y, right - x, bottom - y))
    }

    /// Grow by `padding` on every side, clamped to `bounds`
    pub fn padded(&self, padding: u32, bounds: &PixelRect) -> PixelRect {
        let x = self.x.saturating_sub(padding).max(bounds.x);
        let y = self.y.saturating_sub(padding).max(bounds.y);
        let right = (self.right() + padding).min(bounds.right());
        let bottom = (self.bottom() + padding).min(bounds.bottom());
        PixelRect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// Base tile dimensions of the isometric grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The smaller of the two sides
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidInput(format!(
                "tile size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::new(64, 32)
    }
}

/// Grid metadata of a tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetGeometry {
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
}

impl TilesetGeometry {
    /// Derive columns and rows from the image size and the cell layout
    pub fn from_image_size(
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
        spacing: u32,
        margin: u32,
    ) -> Result<Self, CoreError> {
        TileSize::new(tile_width, tile_height).validate()?;
        let fit = |extent: u32, tile: u32| {
            let usable = extent.saturating_sub(margin * 2) + spacing;
            usable / (tile + spacing)
        };
        Ok(Self {
            columns: fit(image_width, tile_width),
            rows: fit(image_height, tile_height),
            tile_width,
            tile_height,
            spacing,
            margin,
        })
    }

    pub fn tile_size(&self) -> TileSize {
        TileSize::new(self.tile_width, self.tile_height)
    }

    /// Number of grid cells
    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Convert a 0-based cell index to (column, row)
    pub fn index_to_grid(&self, index: u32) -> Option<(u32, u32)> {
        if self.columns == 0 || index >= self.tile_count() {
            return None;
        }
        Some((index % self.columns, index / self.columns))
    }

    /// Pixel rectangle of a 0-based cell index
    pub fn cell_rect(&self, index: u32) -> Option<PixelRect> {
        let (col, row) = self.index_to_grid(index)?;
        Some(PixelRect::new(
            self.margin + col * (self.tile_width + self.spacing),
            self.margin + row * (self.tile_height + self.spacing),
            self.tile_width,
            self.tile_height,
        ))
    }
}
