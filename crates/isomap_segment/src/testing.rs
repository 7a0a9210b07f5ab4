//! Test helpers for building synthetic tileset bitmaps.
#![allow(dead_code)]

use isomap_core::Bitmap;

use crate::components::{detect_components, Component};
use crate::settings::DetectionSettings;

/// An alpha-only drawing surface that converts into a [`Bitmap`]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    alpha: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; (width * height) as usize],
        }
    }

    pub fn set(&mut self, x: u32, y: u32, alpha: u8) {
        if x < self.width && y < self.height {
            self.alpha[(y * self.width + x) as usize] = alpha;
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        self.fill_rect_alpha(x, y, w, h, 255);
    }

    pub fn fill_rect_alpha(&mut self, x: u32, y: u32, w: u32, h: u32, alpha: u8) {
        for py in y..y + h {
            for px in x..x + w {
                self.set(px, py, alpha);
            }
        }
    }

    /// Fill an isometric diamond inscribed in the given box.
    ///
    /// The edge test is slightly generous so diamonds placed side by side
    /// touch at their left/right points.
    pub fn fill_diamond(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let (hw, hh) = (w as f64 / 2.0, h as f64 / 2.0);
        for py in y..y + h {
            for px in x..x + w {
                let dx = ((px - x) as f64 + 0.5 - hw).abs() / hw;
                let dy = ((py - y) as f64 + 0.5 - hh).abs() / hh;
                if dx + dy <= 1.07 {
                    self.set(px, py, 255);
                }
            }
        }
    }

    /// Clear every opaque pixel matching the predicate
    pub fn punch(&mut self, hole: impl Fn(u32, u32) -> bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                if hole(x, y) {
                    self.set(x, y, 0);
                }
            }
        }
    }

    pub fn to_bitmap(&self) -> Bitmap {
        Bitmap::from_alpha(self.width, self.height, &self.alpha).unwrap()
    }

    /// The largest component under default settings
    pub fn single_component(&self) -> Component {
        detect_components(&self.to_bitmap(), &DetectionSettings::default())
            .into_iter()
            .max_by_key(|c| c.pixel_count())
            .expect("canvas has no components")
    }
}

/// Three 64x60 blocks joined by 1px bridges, 64px long
pub fn bridged_blocks() -> Canvas {
    let mut canvas = Canvas::new(330, 70);
    for i in 0..3 {
        canvas.fill_rect(i * 128, 0, 64, 60);
    }
    canvas.fill_rect(64, 30, 64, 1);
    canvas.fill_rect(192, 30, 64, 1);
    canvas
}
