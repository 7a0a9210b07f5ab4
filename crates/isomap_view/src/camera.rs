//! Zoom and pan state of an isometric map view

use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom factor
pub const MAX_ZOOM: f32 = 5.0;

/// Camera for one open map view.
///
/// Pan is stored in unzoomed screen units and applied before zoom, so a
/// screen point is `(projected + anchor + pan) * zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CameraState")]
pub struct IsometricCamera {
    zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for IsometricCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Serialized camera fields, clamped through [`IsometricCamera::new`] on load
#[derive(Deserialize)]
#[serde(default)]
struct CameraState {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl From<CameraState> for IsometricCamera {
    fn from(state: CameraState) -> Self {
        Self::new(state.zoom, state.pan_x, state.pan_y)
    }
}

impl IsometricCamera {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        let mut camera = Self {
            zoom: 1.0,
            pan_x,
            pan_y,
        };
        camera.set_zoom(zoom);
        camera
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Multiply the zoom by `factor`
    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    /// Zoom by `factor` keeping the content under a screen point in place
    pub fn zoom_at(&mut self, screen_x: f32, screen_y: f32, factor: f32) {
        let world_x = screen_x / self.zoom - self.pan_x;
        let world_y = screen_y / self.zoom - self.pan_y;
        self.zoom_by(factor);
        self.pan_x = screen_x / self.zoom - world_x;
        self.pan_y = screen_y / self.zoom - world_y;
    }

    /// Pan by a drag distance in screen pixels
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx / self.zoom;
        self.pan_y += dy / self.zoom;
    }

    /// Back to zoom 1 with no pan, as on loading a new map
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = IsometricCamera::default();
        camera.set_zoom(12.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
        camera.set_zoom(0.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);
        camera.set_zoom(f32::NAN);
        assert_eq!(camera.zoom(), MIN_ZOOM);

        camera.set_zoom(1.0);
        for _ in 0..20 {
            camera.zoom_by(1.5);
        }
        assert_eq!(camera.zoom(), MAX_ZOOM);

        assert_eq!(IsometricCamera::new(-3.0, 0.0, 0.0).zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = IsometricCamera::new(1.0, 10.0, -20.0);
        let (sx, sy) = (300.0, 200.0);
        let before = (sx / camera.zoom() - camera.pan_x, sy / camera.zoom() - camera.pan_y);

        camera.zoom_at(sx, sy, 2.0);
        let after = (sx / camera.zoom() - camera.pan_x, sy / camera.zoom() - camera.pan_y);

        assert_eq!(camera.zoom(), 2.0);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn test_pan_by_is_zoom_aware() {
        let mut camera = IsometricCamera::new(2.0, 0.0, 0.0);
        camera.pan_by(10.0, -4.0);
        assert_eq!((camera.pan_x, camera.pan_y), (5.0, -2.0));

        camera.reset();
        assert_eq!(camera, IsometricCamera::default());
    }

    #[test]
    fn test_deserialize_clamps_zoom() {
        let camera: IsometricCamera = serde_json::from_str(r#"{"zoom": 0.0}"#).unwrap();
        assert_eq!(camera.zoom(), MIN_ZOOM);
        assert_eq!((camera.pan_x, camera.pan_y), (0.0, 0.0));

        let camera: IsometricCamera =
            serde_json::from_str(r#"{"zoom": 40.0, "pan_x": 3.0}"#).unwrap();
        assert_eq!(camera.zoom(), MAX_ZOOM);
        assert_eq!(camera.pan_x, 3.0);

        let empty: IsometricCamera = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, IsometricCamera::default());

        let saved = IsometricCamera::new(2.5, -8.0, 4.0);
        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(serde_json::from_str::<IsometricCamera>(&json).unwrap(), saved);
    }
}
