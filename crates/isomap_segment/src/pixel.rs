//! Transparency classification of single pixels

use isomap_core::Bitmap;

/// Check if the pixel at (x, y) is transparent under `threshold`.
///
/// Pixels outside the bitmap count as transparent.
#[inline]
pub fn is_transparent(bitmap: &Bitmap, x: u32, y: u32, threshold: u8) -> bool {
    bitmap.alpha(x, y).map_or(true, |alpha| alpha <= threshold)
}

/// Transparent/opaque decision for a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelClassifier {
    pub threshold: u8,
}

impl PixelClassifier {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn is_transparent(&self, bitmap: &Bitmap, x: u32, y: u32) -> bool {
        is_transparent(bitmap, x, y, self.threshold)
    }

    #[inline]
    pub fn is_opaque(&self, bitmap: &Bitmap, x: u32, y: u32) -> bool {
        !self.is_transparent(bitmap, x, y)
    }

    /// Count opaque pixels in the whole bitmap
    pub fn count_opaque(&self, bitmap: &Bitmap) -> usize {
        bitmap
            .as_rgba()
            .chunks_exact(4)
            .filter(|px| px[3] > self.threshold)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let bitmap = Bitmap::from_alpha(3, 1, &[10, 11, 255]).unwrap();
        let classifier = PixelClassifier::new(10);

        assert!(classifier.is_transparent(&bitmap, 0, 0));
        assert!(classifier.is_opaque(&bitmap, 1, 0));
        assert!(classifier.is_opaque(&bitmap, 2, 0));
        assert_eq!(classifier.count_opaque(&bitmap), 2);
    }

    #[test]
    fn test_out_of_bounds_is_transparent() {
        let bitmap = Bitmap::from_alpha(1, 1, &[255]).unwrap();
        assert!(is_transparent(&bitmap, 1, 0, 0));
        assert!(is_transparent(&bitmap, 0, 5, 0));
    }
}
