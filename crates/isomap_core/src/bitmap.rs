//! Shared, read-only pixel buffers

use std::fmt;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use uuid::Uuid;

use crate::{CoreError, PixelRect};

/// An immutable RGBA bitmap.
///
/// Cloning is cheap: the pixel data is reference counted so several layer
/// bindings can share one loaded tileset image. Every bitmap carries a stable
/// id so detection results can be cached against it.
#[derive(Clone)]
pub struct Bitmap {
    id: Uuid,
    width: u32,
    height: u32,
    rgba: Arc<[u8]>,
}

impl Bitmap {
    /// Create a bitmap from tightly packed RGBA8 bytes
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidInput(format!(
                "bitmap dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CoreError::InvalidInput(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            width,
            height,
            rgba: rgba.into(),
        })
    }

    /// Create a white bitmap from a single alpha plane (one byte per pixel)
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Result<Self, CoreError> {
        if alpha.len() != width as usize * height as usize {
            return Err(CoreError::InvalidInput(format!(
                "expected {} alpha bytes for {width}x{height}, got {}",
                width as usize * height as usize,
                alpha.len()
            )));
        }
        let rgba = alpha.iter().flat_map(|&a| [255, 255, 255, a]).collect();
        Self::from_rgba(width, height, rgba)
    }

    /// Create a bitmap from a decoded RGBA image
    pub fn from_image(image: &RgbaImage) -> Result<Self, CoreError> {
        Self::from_rgba(image.width(), image.height(), image.as_raw().clone())
    }

    /// Create a bitmap from any decoded image, converting to RGBA8 first
    pub fn from_dynamic_image(image: &DynamicImage) -> Result<Self, CoreError> {
        Self::from_image(&image.to_rgba8())
    }

    /// Stable identity of this bitmap (shared by all clones)
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rectangle covering the whole bitmap
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Alpha value at (x, y), or `None` outside the bitmap
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4 + 3;
        self.rgba.get(idx).copied()
    }

    /// RGBA value at (x, y), or `None` outside the bitmap
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Raw RGBA bytes, row-major
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Whether two handles point at the same pixel buffer
    pub fn shares_pixels_with(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.rgba, &other.rgba)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_buffer() {
        let err = Bitmap::from_rgba(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(Bitmap::from_rgba(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_alpha_lookup() {
        let mut alpha = vec![0u8; 6];
        alpha[4] = 200; // (1, 1) in a 3x2 bitmap
        let bitmap = Bitmap::from_alpha(3, 2, &alpha).unwrap();

        assert_eq!(bitmap.alpha(1, 1), Some(200));
        assert_eq!(bitmap.alpha(0, 0), Some(0));
        assert_eq!(bitmap.alpha(3, 0), None);
        assert_eq!(bitmap.pixel(1, 1), Some([255, 255, 255, 200]));
    }

    #[test]
    fn test_clones_share_pixels_and_id() {
        let bitmap = Bitmap::from_alpha(2, 2, &[255; 4]).unwrap();
        let shared = bitmap.clone();
        assert!(bitmap.shares_pixels_with(&shared));
        assert_eq!(bitmap.id(), shared.id());

        let other = Bitmap::from_alpha(2, 2, &[255; 4]).unwrap();
        assert_ne!(bitmap.id(), other.id());
    }

    #[test]
    fn test_from_image() {
        let mut img = RgbaImage::new(5, 3);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        let bitmap = Bitmap::from_image(&img).unwrap();

        assert_eq!(bitmap.width(), 5);
        assert_eq!(bitmap.height(), 3);
        assert_eq!(bitmap.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(bitmap.alpha(0, 0), Some(0));
    }
}
