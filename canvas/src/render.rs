//! Rendering: rasterizes the composed scene into an RGBA buffer.
//!
//! Rasterization sits behind the [`Rasterizer`] trait so the frame manager
//! can capture through any backend (and tests can inject failures). The
//! bundled [`SoftwareRasterizer`] draws anti-aliased paths with tiny-skia,
//! using the camera as the world-to-screen transform, and hands the result
//! back as an [`RgbaImage`]. It receives read-only views of scene and camera
//! state and does not mutate any application state.
//!
//! Text objects carry no glyph outlines here and are not painted.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

use crate::camera::{Camera, Point, Rect};
use crate::consts::DEFAULT_BACKGROUND;
use crate::doc::{ObjectKind, Props, SceneGraph, SceneObject};
use crate::error::RenderError;

/// Largest surface the software rasterizer will allocate, in pixels.
const MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// Generation frame outline width in screen pixels.
const FRAME_OUTLINE_PX: f64 = 2.0;

const FALLBACK_FILL: [u8; 4] = [217, 75, 75, 255];
const FALLBACK_STROKE: [u8; 4] = [31, 26, 23, 255];
const FALLBACK_FRAME: [u8; 4] = [47, 128, 237, 255];

/// Renders a scene through a camera into a `width` x `height` pixel buffer.
pub trait Rasterizer {
    /// Paint every visible object of `scene` in z-order.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the surface is unusable or the backend fails.
    fn rasterize(&self, scene: &SceneGraph, camera: &Camera, width: u32, height: u32) -> Result<RgbaImage, RenderError>;
}

/// CPU rasterizer for rectangles, circles, brush strokes, images, and frame outlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRasterizer;

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, scene: &SceneGraph, camera: &Camera, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            return Err(RenderError::InvalidSurface { width, height });
        }
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return Err(RenderError::InvalidSurface { width, height });
        };

        let background = parse_hex_color(scene.background())
            .or_else(|| parse_hex_color(DEFAULT_BACKGROUND))
            .unwrap_or(Rgba([255, 255, 255, 255]));
        pixmap.fill(skia_color(background));

        // screen = world * zoom + pan
        let transform = Transform::from_scale(to_f32(camera.zoom), to_f32(camera.zoom))
            .post_translate(to_f32(camera.pan_x), to_f32(camera.pan_y));

        for obj in scene.objects().iter().filter(|o| o.visible) {
            draw_object(&mut pixmap, obj, camera.zoom, transform);
        }
        to_rgba_image(&pixmap)
    }
}

// =============================================================
// Object dispatch
// =============================================================

fn draw_object(pixmap: &mut Pixmap, obj: &SceneObject, zoom: f64, transform: Transform) {
    let props = Props::new(&obj.props);
    let bounds = obj.bounds();

    match obj.kind {
        ObjectKind::Rect => {
            if let Some(path) = skia_rect(&bounds).map(PathBuilder::from_rect) {
                fill_path(pixmap, &path, color_or(props.fill(), FALLBACK_FILL), transform);
                stroke_path(pixmap, &path, props.stroke_width(), color_or(props.stroke(), FALLBACK_STROKE), transform);
            }
        }
        ObjectKind::Circle => {
            if let Some(path) = skia_rect(&bounds).and_then(PathBuilder::from_oval) {
                fill_path(pixmap, &path, color_or(props.fill(), FALLBACK_FILL), transform);
                stroke_path(pixmap, &path, props.stroke_width(), color_or(props.stroke(), FALLBACK_STROKE), transform);
            }
        }
        ObjectKind::Stroke => {
            // At least one screen pixel wide at any zoom.
            let width = props.stroke_width().max(1.0 / zoom);
            draw_polyline(pixmap, &obj.points, width, color_or(props.stroke(), FALLBACK_STROKE), transform);
        }
        ObjectKind::Image => {
            if let Some(payload) = &obj.image {
                draw_image(pixmap, &payload.pixels, &bounds, transform);
            }
        }
        ObjectKind::Frame => {
            if let Some(path) = skia_rect(&bounds).map(PathBuilder::from_rect) {
                let color = color_or(props.stroke(), FALLBACK_FRAME);
                stroke_path(pixmap, &path, FRAME_OUTLINE_PX / zoom, color, transform);
            }
        }
        ObjectKind::Text => {}
    }
}

// =============================================================
// Colors
// =============================================================

/// Parse `#RRGGBB` or `#RRGGBBAA`.
#[must_use]
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let channel = |i: usize| match u8::from_str_radix(&hex[i..i + 2], 16) {
        Ok(byte) => Some(byte),
        Err(_) => None,
    };
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, a]))
}

fn color_or(hex: &str, fallback: [u8; 4]) -> Rgba<u8> {
    parse_hex_color(hex).unwrap_or(Rgba(fallback))
}

fn skia_color(color: Rgba<u8>) -> Color {
    let [r, g, b, a] = color.0;
    Color::from_rgba8(r, g, b, a)
}

fn solid(color: Rgba<u8>) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

// =============================================================
// Primitives
// =============================================================

#[allow(clippy::cast_possible_truncation)]
fn to_f32(v: f64) -> f32 {
    v as f32
}

fn skia_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(to_f32(rect.x), to_f32(rect.y), to_f32(rect.width), to_f32(rect.height))
}

fn fill_path(pixmap: &mut Pixmap, path: &Path, color: Rgba<u8>, transform: Transform) {
    pixmap.fill_path(path, &solid(color), FillRule::Winding, transform, None);
}

/// Stroke in world units. A zero width would be a hairline in tiny-skia, so it paints nothing instead.
fn stroke_path(pixmap: &mut Pixmap, path: &Path, width: f64, color: Rgba<u8>, transform: Transform) {
    if width <= 0.0 || !width.is_finite() {
        return;
    }
    let stroke = Stroke { width: to_f32(width), ..Stroke::default() };
    pixmap.stroke_path(path, &solid(color), &stroke, transform, None);
}

fn draw_polyline(pixmap: &mut Pixmap, pts: &[Point], width: f64, color: Rgba<u8>, transform: Transform) {
    let [first, rest @ ..] = pts else {
        return;
    };
    if rest.is_empty() {
        if let Some(dot) = PathBuilder::from_circle(to_f32(first.x), to_f32(first.y), to_f32(width * 0.5)) {
            fill_path(pixmap, &dot, color, transform);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(to_f32(first.x), to_f32(first.y));
    for p in rest {
        pb.line_to(to_f32(p.x), to_f32(p.y));
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: to_f32(width),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid(color), &stroke, transform, None);
}

/// Stretch `src` over `dest` (world units). Only covered surface pixels are sampled.
fn draw_image(pixmap: &mut Pixmap, src: &RgbaImage, dest: &Rect, transform: Transform) {
    if dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }
    let Some(source) = to_pixmap(src) else {
        return;
    };
    let placement = transform
        .pre_translate(to_f32(dest.x), to_f32(dest.y))
        .pre_scale(
            to_f32(dest.width / f64::from(src.width())),
            to_f32(dest.height / f64::from(src.height())),
        );
    let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, placement, None);
}

// =============================================================
// Buffer conversion
// =============================================================

fn to_pixmap(src: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(src.width(), src.height())?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(src.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| RenderError::Backend("pixmap size mismatch".into()))
}
