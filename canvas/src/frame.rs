//! Generation frame: the single crop region sent for regeneration.
//!
//! At most one frame lives in the scene. Capturing hides the frame outline
//! for exactly the duration of the rasterization call. The hide/restore is
//! held by a drop guard, so visibility comes back on every exit path,
//! including rasterizer errors and unwinding panics.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::io::Cursor;
use std::ops::Deref;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::camera::Rect;
use crate::consts::DEFAULT_RESULT_WIDTH;
use crate::doc::{ImagePayload, ObjectId, ObjectKind, SceneGraph, SceneObject};
use crate::error::CaptureError;
use crate::render::Rasterizer;
use crate::viewport::ViewportController;

/// Outcome of [`GenerationFrameManager::set_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReplacement {
    pub id: ObjectId,
    /// Frames removed from the scene to make room for the new one.
    pub evicted: Vec<ObjectId>,
}

/// Pixels exported by [`GenerationFrameManager::capture_region`].
#[derive(Debug, Clone)]
pub struct CapturedRegion {
    pub image: RgbaImage,
    /// Crop rectangle in surface pixels.
    pub screen_rect: Rect,
    /// Frame that bounded the crop, or `None` for a full-surface capture.
    pub frame: Option<ObjectId>,
}

impl CapturedRegion {
    /// Encode the captured pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Encode`] if the PNG encoder fails.
    pub fn to_png(&self) -> Result<Vec<u8>, CaptureError> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    /// PNG bytes as a `data:image/png;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Encode`] if the PNG encoder fails.
    pub fn to_data_url(&self) -> Result<String, CaptureError> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

/// Hides one object while alive and restores its previous visibility on drop.
struct VisibilityGuard<'a> {
    scene: &'a mut SceneGraph,
    id: ObjectId,
    previous: bool,
}

impl<'a> VisibilityGuard<'a> {
    fn hide(scene: &'a mut SceneGraph, id: ObjectId) -> Self {
        let previous = match scene.get_mut(&id) {
            Some(obj) => std::mem::replace(&mut obj.visible, false),
            None => false,
        };
        Self { scene, id, previous }
    }
}

impl Deref for VisibilityGuard<'_> {
    type Target = SceneGraph;

    fn deref(&self) -> &SceneGraph {
        self.scene
    }
}

impl Drop for VisibilityGuard<'_> {
    fn drop(&mut self) {
        if let Some(obj) = self.scene.get_mut(&self.id) {
            obj.visible = self.previous;
        }
    }
}

/// Tracks the active generation frame.
#[derive(Debug, Clone, Default)]
pub struct GenerationFrameManager {
    active: Option<ObjectId>,
}

impl GenerationFrameManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing frame with a new one covering `rect` (world units).
    ///
    /// The new frame is added on top of the scene and becomes the selection.
    pub fn set_frame(&mut self, scene: &mut SceneGraph, rect: Rect) -> FrameReplacement {
        let evicted = scene.ids_of_kind(ObjectKind::Frame);
        for id in &evicted {
            scene.remove(id);
        }
        let id = scene.add(SceneObject::frame(rect));
        self.active = Some(id);
        tracing::debug!(%id, evicted = evicted.len(), "generation frame set");
        FrameReplacement { id, evicted }
    }

    #[must_use]
    pub fn active_id(&self) -> Option<ObjectId> {
        self.active
    }

    /// The active frame object, if it is still in the scene.
    #[must_use]
    pub fn active_frame<'a>(&self, scene: &'a SceneGraph) -> Option<&'a SceneObject> {
        let id = self.active?;
        scene.get(&id).filter(|o| o.kind == ObjectKind::Frame)
    }

    /// Drop the active frame reference if it is `id`. Returns whether it was.
    pub fn forget(&mut self, id: &ObjectId) -> bool {
        if self.active.as_ref() == Some(id) {
            self.active = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Rasterize the scene and crop to the active frame.
    ///
    /// The frame outline is hidden during rasterization so it does not appear
    /// in the export. With no active frame the whole surface is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Render`] when the rasterizer fails and
    /// [`CaptureError::EmptyRegion`] when the frame lies entirely off-surface.
    pub fn capture_region<R: Rasterizer + ?Sized>(
        &self,
        scene: &mut SceneGraph,
        viewport: &ViewportController,
        rasterizer: &R,
    ) -> Result<CapturedRegion, CaptureError> {
        let camera = viewport.camera();
        let (width, height) = surface_pixels(viewport);

        let Some(frame) = self.active_frame(scene) else {
            let image = rasterizer.rasterize(scene, &camera, width, height)?;
            tracing::debug!(width, height, "captured full surface");
            return Ok(CapturedRegion { image, screen_rect: viewport.surface_rect(), frame: None });
        };
        let frame_id = frame.id;
        let screen = camera.world_rect_to_screen(&frame.bounds());

        let guard = VisibilityGuard::hide(scene, frame_id);
        let rendered = rasterizer.rasterize(&guard, &camera, width, height);
        drop(guard);
        let full = rendered?;

        let crop = pixel_crop(&screen, width, height).ok_or(CaptureError::EmptyRegion)?;
        let image = image::imageops::crop_imm(&full, crop.0, crop.1, crop.2, crop.3).to_image();
        let screen_rect = Rect::new(f64::from(crop.0), f64::from(crop.1), f64::from(crop.2), f64::from(crop.3));
        tracing::debug!(frame = %frame_id, w = crop.2, h = crop.3, "captured frame region");
        Ok(CapturedRegion { image, screen_rect, frame: Some(frame_id) })
    }

    /// Insert a generated image into the scene.
    ///
    /// With a `target` frame the image takes the frame's bounds exactly and
    /// the frame is raised above it so it stays grabbable. Without one the
    /// image is scaled to [`DEFAULT_RESULT_WIDTH`] (keeping its aspect ratio)
    /// and centred in the viewport. The frame is never removed.
    pub fn place_result(
        &self,
        scene: &mut SceneGraph,
        viewport: &ViewportController,
        payload: ImagePayload,
        target: Option<ObjectId>,
    ) -> ObjectId {
        let frame_bounds = target
            .and_then(|id| scene.get(&id))
            .filter(|o| o.kind == ObjectKind::Frame)
            .map(|o| (o.id, o.bounds()));

        if let Some((frame_id, bounds)) = frame_bounds {
            let id = scene.add(SceneObject::image(bounds, payload));
            scene.bring_to_front(&frame_id);
            tracing::debug!(%id, frame = %frame_id, "placed result into frame");
            return id;
        }

        let (natural_w, natural_h) = payload.natural_size();
        let height = if natural_w > 0 {
            DEFAULT_RESULT_WIDTH * f64::from(natural_h) / f64::from(natural_w)
        } else {
            DEFAULT_RESULT_WIDTH
        };
        let center = viewport.center_world();
        let rect = Rect::new(center.x - DEFAULT_RESULT_WIDTH * 0.5, center.y - height * 0.5, DEFAULT_RESULT_WIDTH, height);
        let id = scene.add(SceneObject::image(rect, payload));
        tracing::debug!(%id, "placed result at viewport centre");
        id
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn surface_pixels(viewport: &ViewportController) -> (u32, u32) {
    (viewport.width().round().max(0.0) as u32, viewport.height().round().max(0.0) as u32)
}

/// Pixel-aligned crop `(x, y, w, h)` covering `screen`, clipped to the surface.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_crop(screen: &Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let clipped = screen.intersect(&Rect::new(0.0, 0.0, f64::from(width), f64::from(height)))?;
    let x0 = clipped.x.floor() as u32;
    let y0 = clipped.y.floor() as u32;
    let x1 = (clipped.right().ceil() as u32).min(width);
    let y1 = (clipped.bottom().ceil() as u32).min(height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}
