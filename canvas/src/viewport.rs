//! Viewport controller: surface dimensions, zoom-to-point, and pan gestures.
//!
//! The controller is the only writer of [`Camera`]. Every mutating call
//! reports whether the scene needs to be re-rendered so the engine can emit
//! a single [`crate::engine::Action::RenderNeeded`].

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{WHEEL_ZOOM_BASE, ZOOM_MAX, ZOOM_MIN};

/// Owns the pan/zoom transform and the host surface size.
#[derive(Debug, Clone)]
pub struct ViewportController {
    camera: Camera,
    width: f64,
    height: f64,
    /// Screen position of the previous pan event while a pan is active.
    pan_anchor: Option<Point>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self { camera: Camera::default(), width: 1.0, height: 1.0, pan_anchor: None }
    }
}

impl ViewportController {
    /// Create a controller for a surface of the given pixel size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let mut vp = Self::default();
        vp.resize(width, height);
        vp
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The whole surface in screen pixels.
    #[must_use]
    pub fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// World point currently under the centre of the surface.
    #[must_use]
    pub fn center_world(&self) -> Point {
        self.camera
            .screen_to_world(Point::new(self.width * 0.5, self.height * 0.5))
    }

    /// Zoom by `WHEEL_ZOOM_BASE ^ delta_y`, keeping the world point under the pointer fixed on screen.
    ///
    /// The resulting zoom is always clamped to `[ZOOM_MIN, ZOOM_MAX]`.
    pub fn zoom_at(&mut self, pointer_x: f64, pointer_y: f64, delta_y: f64) -> bool {
        if delta_y.is_nan() {
            return false;
        }
        let zoom = (self.camera.zoom * WHEEL_ZOOM_BASE.powf(delta_y)).clamp(ZOOM_MIN, ZOOM_MAX);
        if (zoom - self.camera.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.camera = self.camera.zoomed_about(Point::new(pointer_x, pointer_y), zoom);
        true
    }

    /// Start a pan gesture. Ignored while another pan is already active.
    pub fn begin_pan(&mut self, pointer_x: f64, pointer_y: f64) -> bool {
        if self.pan_anchor.is_some() {
            return false;
        }
        self.pan_anchor = Some(Point::new(pointer_x, pointer_y));
        true
    }

    /// Translate the pan offset by the pointer delta since the previous event.
    pub fn continue_pan(&mut self, pointer_x: f64, pointer_y: f64) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.camera = self.camera.panned(pointer_x - last.x, pointer_y - last.y);
        self.pan_anchor = Some(Point::new(pointer_x, pointer_y));
        true
    }

    /// Finish the active pan gesture, if any.
    pub fn end_pan(&mut self) -> bool {
        self.pan_anchor.take().is_some()
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Adopt new host surface dimensions. Zoom and pan are left untouched.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let width = if width.is_finite() { width.max(1.0) } else { 1.0 };
        let height = if height.is_finite() { height.max(1.0) } else { 1.0 };
        let changed = (width - self.width).abs() > f64::EPSILON || (height - self.height).abs() > f64::EPSILON;
        self.width = width;
        self.height = height;
        changed
    }

    /// Replace the camera, clamping zoom into range.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Camera { zoom: camera.zoom.clamp(ZOOM_MIN, ZOOM_MAX), ..camera };
    }
}
