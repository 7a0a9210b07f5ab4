//! Connected component detection over bitmap transparency
//!
//! Components are 8-connected sets of opaque pixels. The flood fill uses an
//! explicit stack so large sprites cannot overflow the call stack.

use isomap_core::{Bitmap, PixelRect};

use crate::pixel::PixelClassifier;
use crate::settings::DetectionSettings;

/// A connected set of opaque pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Tight bounds plus padding, clamped to the detection area
    pub bounds: PixelRect,
    /// Tight bounds of the opaque pixels
    pub content: PixelRect,
    /// Opaque pixels in bitmap coordinates, in discovery order
    pub pixels: Vec<(u32, u32)>,
}

impl Component {
    /// Build a component from its pixels; `None` if there are none
    pub fn from_pixels(pixels: Vec<(u32, u32)>, padding: u32, area: &PixelRect) -> Option<Self> {
        let content = tight_bounds(pixels.iter().copied())?;
        Some(Self {
            bounds: content.padded(padding, area),
            content,
            pixels,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Opaque pixel count divided by the tight bounding area
    pub fn density(&self) -> f64 {
        let area = self.content.area();
        if area == 0 {
            return 0.0;
        }
        self.pixels.len() as f64 / area as f64
    }

    /// Check the noise filter on the padded bounds
    pub fn meets_min_size(&self, min_size: u32) -> bool {
        meets_min_size(&self.bounds, min_size)
    }
}

/// Every side must reach `min_size` and the area `min_size²`
pub fn meets_min_size(rect: &PixelRect, min_size: u32) -> bool {
    rect.width >= min_size
        && rect.height >= min_size
        && rect.area() >= min_size as u64 * min_size as u64
}

/// Smallest rectangle covering every pixel, `None` for an empty set
pub fn tight_bounds(pixels: impl IntoIterator<Item = (u32, u32)>) -> Option<PixelRect> {
    let mut iter = pixels.into_iter();
    let (x0, y0) = iter.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    for (x, y) in iter {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some(PixelRect::from_extents(min_x, min_y, max_x, max_y))
}

/// Detect all components in the whole bitmap, in row-major scan order
pub fn detect_components(bitmap: &Bitmap, settings: &DetectionSettings) -> Vec<Component> {
    detect_in_rect(bitmap, bitmap.rect(), settings)
}

/// Detect components restricted to `area`.
///
/// Pixels outside `area` are treated as transparent and padding is clamped to
/// `area`, so every result lies inside it.
pub fn detect_in_rect(
    bitmap: &Bitmap,
    area: PixelRect,
    settings: &DetectionSettings,
) -> Vec<Component> {
    let Some(area) = area.intersection(&bitmap.rect()) else {
        return Vec::new();
    };

    let classifier = PixelClassifier::new(settings.threshold);
    let width = area.width as usize;
    let height = area.height as usize;
    let mut visited = vec![false; width * height];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut components = Vec::new();
    let mut dropped = 0usize;

    for start_y in 0..height {
        for start_x in 0..width {
            let start = start_y * width + start_x;
            if visited[start] {
                continue;
            }
            visited[start] = true;
            if classifier.is_transparent(bitmap, area.x + start_x as u32, area.y + start_y as u32)
            {
                continue;
            }

            let mut pixels = Vec::new();
            stack.push((start_x, start_y));
            while let Some((cx, cy)) = stack.pop() {
                pixels.push((area.x + cx as u32, area.y + cy as u32));

                for ny in cy.saturating_sub(1)..=(cy + 1).min(height - 1) {
                    for nx in cx.saturating_sub(1)..=(cx + 1).min(width - 1) {
                        let idx = ny * width + nx;
                        if visited[idx] {
                            continue;
                        }
                        visited[idx] = true;
                        if classifier.is_opaque(bitmap, area.x + nx as u32, area.y + ny as u32) {
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            match Component::from_pixels(pixels, settings.padding, &area) {
                Some(component) if component.meets_min_size(settings.min_size) => {
                    components.push(component)
                }
                _ => dropped += 1,
            }
        }
    }

    log::debug!(
        "detected {} components in {}x{} area at ({}, {}), dropped {} as noise",
        components.len(),
        area.width,
        area.height,
        area.x,
        area.y,
        dropped
    );
    components
}
