//! Map to screen transforms for diamond isometric grids
//!
//! A cell `(x, y)` projects to the centre of its diamond:
//!
//! ```text
//! screen_x = ((x - y) * tile_width / 2  + anchor_x + pan_x) * zoom
//! screen_y = ((x + y) * tile_height / 2 + anchor_y + pan_y) * zoom
//! ```

use isomap_core::{Region, TileSize};
use serde::{Deserialize, Serialize};

use crate::camera::IsometricCamera;

/// Default diamond hit-test tolerance; below 1.0 so shared edges never tie
pub const DEFAULT_PICK_TOLERANCE: f32 = 0.9;

/// View configuration for an isometric map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Screen offset of cell (0, 0) before pan and zoom
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub pick_tolerance: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        let tile = TileSize::default();
        Self {
            tile_width: tile.width,
            tile_height: tile.height,
            anchor_x: 0.0,
            anchor_y: 0.0,
            pick_tolerance: DEFAULT_PICK_TOLERANCE,
        }
    }
}

impl ViewSettings {
    pub fn tile_size(&self) -> TileSize {
        TileSize::new(self.tile_width, self.tile_height)
    }
}

/// Inclusive range of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileRange {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Number of cells; an inclusive range always holds at least one
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize * (self.max_y - self.min_y + 1) as usize
    }

    /// Cells in back-to-front painter's order: by `x + y`, then by `x`
    pub fn draw_order(&self) -> Vec<(u32, u32)> {
        let mut cells: Vec<(u32, u32)> = (self.min_y..=self.max_y)
            .flat_map(|y| (self.min_x..=self.max_x).map(move |x| (x, y)))
            .collect();
        cells.sort_by_key(|&(x, y)| (x as u64 + y as u64, x));
        cells
    }
}

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Converts between grid cells and screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsometricProjector {
    half_width: f32,
    half_height: f32,
    anchor_x: f32,
    anchor_y: f32,
    tolerance: f32,
}

impl IsometricProjector {
    pub fn new(tile: TileSize) -> Self {
        Self {
            half_width: tile.width as f32 / 2.0,
            half_height: tile.height as f32 / 2.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            tolerance: DEFAULT_PICK_TOLERANCE,
        }
    }

    pub fn from_settings(settings: &ViewSettings) -> Self {
        Self::new(settings.tile_size())
            .with_anchor(settings.anchor_x, settings.anchor_y)
            .with_tolerance(settings.pick_tolerance)
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor_x = x;
        self.anchor_y = y;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Screen position of a (possibly fractional) map coordinate
    pub fn map_to_screen(&self, map_x: f32, map_y: f32, camera: &IsometricCamera) -> (f32, f32) {
        let x = (map_x - map_y) * self.half_width + self.anchor_x + camera.pan_x;
        let y = (map_x + map_y) * self.half_height + self.anchor_y + camera.pan_y;
        (x * camera.zoom(), y * camera.zoom())
    }

    /// Screen position of a cell's diamond centre
    pub fn tile_center(&self, x: u32, y: u32, camera: &IsometricCamera) -> (f32, f32) {
        self.map_to_screen(x as f32, y as f32, camera)
    }

    /// Fractional map coordinate under a screen point
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32, camera: &IsometricCamera) -> (f32, f32) {
        let u = (screen_x / camera.zoom() - camera.pan_x - self.anchor_x) / self.half_width;
        let v = (screen_y / camera.zoom() - camera.pan_y - self.anchor_y) / self.half_height;
        ((u + v) / 2.0, (v - u) / 2.0)
    }

    /// Check if a screen point falls inside the diamond centred at `center`
    pub fn in_diamond(
        &self,
        screen_x: f32,
        screen_y: f32,
        center: (f32, f32),
        camera: &IsometricCamera,
    ) -> bool {
        let dx = (screen_x - center.0).abs() / (self.half_width * camera.zoom());
        let dy = (screen_y - center.1).abs() / (self.half_height * camera.zoom());
        dx + dy <= self.tolerance
    }

    /// Cell whose diamond contains a screen point, nearest centre first.
    ///
    /// Any matching cell lies within half a cell of the inverse-projected
    /// point, so only that neighbourhood is tested.
    pub fn pick_tile(
        &self,
        screen_x: f32,
        screen_y: f32,
        camera: &IsometricCamera,
        map_width: u32,
        map_height: u32,
    ) -> Option<(u32, u32)> {
        let (wx, wy) = self.screen_to_world(screen_x, screen_y, camera);
        let xs = candidate_span(wx, map_width)?;
        let ys = candidate_span(wy, map_height)?;

        let mut best: Option<((u32, u32), f32)> = None;
        for y in ys.0..=ys.1 {
            for x in xs.0..=xs.1 {
                let center = self.tile_center(x, y, camera);
                if !self.in_diamond(screen_x, screen_y, center, camera) {
                    continue;
                }
                let dist = (screen_x - center.0).powi(2) + (screen_y - center.1).powi(2);
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some(((x, y), dist));
                }
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Cells that may be visible in a viewport of the given screen size
    pub fn visible_tiles(
        &self,
        viewport_width: f32,
        viewport_height: f32,
        camera: &IsometricCamera,
        map_width: u32,
        map_height: u32,
    ) -> Option<TileRange> {
        if map_width == 0 || map_height == 0 {
            return None;
        }
        let corners = [
            self.screen_to_world(0.0, 0.0, camera),
            self.screen_to_world(viewport_width, 0.0, camera),
            self.screen_to_world(0.0, viewport_height, camera),
            self.screen_to_world(viewport_width, viewport_height, camera),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        // pad by one cell for diamonds straddling the viewport edge
        let (x0, x1) = clamp_span(min_x - 1.0, max_x + 1.0, map_width)?;
        let (y0, y1) = clamp_span(min_y - 1.0, max_y + 1.0, map_height)?;
        Some(TileRange {
            min_x: x0,
            min_y: y0,
            max_x: x1,
            max_y: y1,
        })
    }

    /// Screen rectangle for drawing a sprite so its origin sits on a cell centre
    pub fn sprite_screen_rect(
        &self,
        region: &Region,
        x: u32,
        y: u32,
        camera: &IsometricCamera,
    ) -> ScreenRect {
        let (cx, cy) = self.tile_center(x, y, camera);
        let zoom = camera.zoom();
        ScreenRect {
            x: cx - region.origin_x as f32 * zoom,
            y: cy - region.origin_y as f32 * zoom,
            width: region.width as f32 * zoom,
            height: region.height as f32 * zoom,
        }
    }
}

/// Cells within one of `value`, clamped to `0..len`
fn candidate_span(value: f32, len: u32) -> Option<(u32, u32)> {
    clamp_span(value - 1.0, value + 1.0, len)
}

fn clamp_span(lo: f32, hi: f32, len: u32) -> Option<(u32, u32)> {
    if len == 0 || !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let last = (len - 1) as f32;
    let lo = lo.floor().max(0.0);
    let hi = hi.ceil().min(last);
    if hi < lo {
        return None;
    }
    Some((lo as u32, hi as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> IsometricProjector {
        IsometricProjector::new(TileSize::new(64, 32))
    }

    #[test]
    fn test_map_to_screen() {
        let p = projector();
        let camera = IsometricCamera::default();
        assert_eq!(p.map_to_screen(0.0, 0.0, &camera), (0.0, 0.0));
        assert_eq!(p.map_to_screen(1.0, 0.0, &camera), (32.0, 16.0));
        assert_eq!(p.map_to_screen(0.0, 1.0, &camera), (-32.0, 16.0));
        assert_eq!(p.map_to_screen(3.0, 2.0, &camera), (32.0, 80.0));

        let moved = IsometricCamera::new(2.0, 10.0, 5.0);
        let anchored = p.with_anchor(100.0, 0.0);
        assert_eq!(anchored.map_to_screen(1.0, 0.0, &moved), (284.0, 42.0));
    }

    #[test]
    fn test_screen_to_world_inverts() {
        let p = projector().with_anchor(400.0, 30.0);
        let camera = IsometricCamera::new(1.5, -12.0, 7.0);
        for (mx, my) in [(0.0, 0.0), (4.5, 2.25), (17.0, 3.0), (-2.0, 9.5)] {
            let (sx, sy) = p.map_to_screen(mx, my, &camera);
            let (wx, wy) = p.screen_to_world(sx, sy, &camera);
            assert!((wx - mx).abs() < 1e-3, "x: {wx} vs {mx}");
            assert!((wy - my).abs() < 1e-3, "y: {wy} vs {my}");
        }
    }

    #[test]
    fn test_pick_round_trip() {
        let p = projector();
        let camera = IsometricCamera::default();
        for y in 0..50 {
            for x in 0..50 {
                let (sx, sy) = p.tile_center(x, y, &camera);
                assert_eq!(p.pick_tile(sx, sy, &camera, 50, 50), Some((x, y)));
            }
        }
    }

    #[test]
    fn test_pick_round_trip_zoomed_and_panned() {
        let p = projector().with_anchor(640.0, 20.0);
        let camera = IsometricCamera::new(0.5, 33.0, -17.0);
        for y in 0..20 {
            for x in 0..20 {
                let (sx, sy) = p.tile_center(x, y, &camera);
                assert_eq!(p.pick_tile(sx + 3.0, sy - 1.0, &camera, 20, 20), Some((x, y)));
            }
        }
    }

    #[test]
    fn test_pick_outside_map() {
        let p = projector();
        let camera = IsometricCamera::default();
        assert_eq!(p.pick_tile(0.0, -40.0, &camera, 10, 10), None);
        assert_eq!(p.pick_tile(5000.0, 5000.0, &camera, 10, 10), None);
        assert_eq!(p.pick_tile(0.0, 0.0, &camera, 0, 0), None);
    }

    #[test]
    fn test_pick_diamond_edge_is_not_hit() {
        let p = projector();
        let camera = IsometricCamera::default();
        // Exactly between cells (0, 0) and (1, 0)
        assert_eq!(p.pick_tile(16.0, 8.0, &camera, 10, 10), None);
        // Slightly inside (1, 0)
        assert_eq!(p.pick_tile(22.0, 11.0, &camera, 10, 10), Some((1, 0)));
    }

    #[test]
    fn test_visible_tiles_clamped() {
        let p = projector().with_anchor(320.0, 0.0);
        let camera = IsometricCamera::default();
        let range = p.visible_tiles(640.0, 480.0, &camera, 100, 100).unwrap();

        assert_eq!((range.min_x, range.min_y), (0, 0));
        assert!(range.contains(10, 10));
        assert!(!range.contains(60, 60));
        assert!(p.visible_tiles(640.0, 480.0, &camera, 0, 5).is_none());
    }

    #[test]
    fn test_draw_order_back_to_front() {
        let range = TileRange {
            min_x: 0,
            min_y: 0,
            max_x: 1,
            max_y: 1,
        };
        assert_eq!(range.len(), 4);
        assert_eq!(range.draw_order(), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_sprite_rect_anchors_origin_to_center() {
        let p = projector();
        let camera = IsometricCamera::new(2.0, 0.0, 0.0);
        let tree = Region::from_rect(isomap_core::PixelRect::new(0, 0, 64, 96), 32);

        let rect = p.sprite_screen_rect(&tree, 1, 0, &camera);
        assert_eq!(
            rect,
            ScreenRect {
                x: 0.0,
                y: -128.0,
                width: 128.0,
                height: 192.0,
            }
        );
    }
}
