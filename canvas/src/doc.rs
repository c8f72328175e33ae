//! Scene model: drawable objects, their properties, and the scene graph.
//!
//! This module defines the data types that describe what is on the surface
//! (`SceneObject`, `ObjectKind`), a sparse-update type for incremental edits
//! (`PartialSceneObject`), a typed accessor for the open-ended `props` JSON bag
//! (`Props`), and the ordered store that owns all live objects (`SceneGraph`).
//!
//! Objects enter the graph from tool handlers (shapes, text, strokes) and from
//! the frame manager (generation frames, generated images). Insertion order is
//! z-order: the last object added is drawn on top and becomes the active
//! selection.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{
    BRUSH_COLOR, BRUSH_WIDTH, DEFAULT_BACKGROUND, DEFAULT_FILL, DEFAULT_FONT_SIZE, DEFAULT_STROKE, FRAME_STROKE,
    MIN_OBJECT_SIZE, TEXT_ADVANCE_RATIO, TEXT_LINE_HEIGHT,
};

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// The kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Axis-aligned filled rectangle.
    Rect,
    /// Circle (ellipse) inscribed within the bounding box.
    Circle,
    /// Single-line text label.
    Text,
    /// Freehand brush stroke; geometry lives in `points`.
    Stroke,
    /// Raster image stretched to the bounding box.
    Image,
    /// Generation frame: the rectangle that designates the region to regenerate.
    Frame,
}

/// Decoded pixels backing an image object.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Where the pixels came from (e.g. a generated `image_url`), if known.
    pub source: Option<String>,
    /// RGBA pixels at their natural resolution.
    pub pixels: Arc<RgbaImage>,
}

impl ImagePayload {
    #[must_use]
    pub fn new(pixels: RgbaImage, source: Option<String>) -> Self {
        Self { source, pixels: Arc::new(pixels) }
    }

    /// Natural pixel size as `(width, height)`.
    #[must_use]
    pub fn natural_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// A drawable object owned by the [`SceneGraph`].
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Shape type.
    pub kind: ObjectKind,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Width of the bounding box in world coordinates.
    pub width: f64,
    /// Height of the bounding box in world coordinates.
    pub height: f64,
    /// Stacking order; assigned by the graph on insertion.
    pub z_index: i64,
    /// Whether the select tool may pick this object.
    pub selectable: bool,
    /// Hidden objects are skipped by the renderer and by hit-testing.
    pub visible: bool,
    /// Open-ended per-kind properties (fill, stroke, text, etc.).
    pub props: serde_json::Value,
    /// Brush stroke points in world coordinates. Empty for other kinds.
    pub points: Vec<Point>,
    /// Pixels for image objects.
    pub image: Option<ImagePayload>,
}

impl SceneObject {
    fn base(kind: ObjectKind, rect: Rect, props: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            z_index: 0,
            selectable: true,
            visible: true,
            props,
            points: Vec::new(),
            image: None,
        }
    }

    /// A filled rectangle with default styling.
    #[must_use]
    pub fn rect(rect: Rect) -> Self {
        Self::base(
            ObjectKind::Rect,
            rect,
            serde_json::json!({ "fill": DEFAULT_FILL, "stroke": DEFAULT_STROKE, "stroke_width": 1.0 }),
        )
    }

    /// A circle inscribed in `rect` with default styling.
    #[must_use]
    pub fn circle(rect: Rect) -> Self {
        Self::base(
            ObjectKind::Circle,
            rect,
            serde_json::json!({ "fill": DEFAULT_FILL, "stroke": DEFAULT_STROKE, "stroke_width": 1.0 }),
        )
    }

    /// A text label whose top-left corner sits at `origin`.
    #[must_use]
    pub fn text(origin: Point, content: &str) -> Self {
        let (width, height) = estimate_text_size(content, DEFAULT_FONT_SIZE);
        Self::base(
            ObjectKind::Text,
            Rect::new(origin.x, origin.y, width, height),
            serde_json::json!({ "text": content, "font_size": DEFAULT_FONT_SIZE, "fill": DEFAULT_STROKE }),
        )
    }

    /// An immutable brush stroke through `points`. Bounds include half the stroke width.
    #[must_use]
    pub fn stroke(points: Vec<Point>) -> Self {
        let bounds = points_bounds(&points, BRUSH_WIDTH * 0.5);
        let mut obj = Self::base(
            ObjectKind::Stroke,
            bounds,
            serde_json::json!({ "stroke": BRUSH_COLOR, "stroke_width": BRUSH_WIDTH }),
        );
        obj.points = points;
        obj
    }

    /// An image stretched to `rect`.
    #[must_use]
    pub fn image(rect: Rect, payload: ImagePayload) -> Self {
        let mut obj = Self::base(ObjectKind::Image, rect, serde_json::json!({}));
        obj.image = Some(payload);
        obj
    }

    /// A generation frame covering `rect`.
    #[must_use]
    pub fn frame(rect: Rect) -> Self {
        Self::base(
            ObjectKind::Frame,
            rect,
            serde_json::json!({ "stroke": FRAME_STROKE, "stroke_width": 2.0 }),
        )
    }

    /// Bounding box in world coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Move the object by a world-space delta. Stroke points move with it.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Fit the object to new bounds. Stroke points are rescaled into the new box.
    pub fn set_bounds(&mut self, rect: Rect) {
        let width = rect.width.max(MIN_OBJECT_SIZE);
        let height = rect.height.max(MIN_OBJECT_SIZE);
        if !self.points.is_empty() {
            let sx = if self.width > 0.0 { width / self.width } else { 1.0 };
            let sy = if self.height > 0.0 { height / self.height } else { 1.0 };
            for p in &mut self.points {
                p.x = rect.x + (p.x - self.x) * sx;
                p.y = rect.y + (p.y - self.y) * sy;
            }
        }
        self.x = rect.x;
        self.y = rect.y;
        self.width = width;
        self.height = height;
    }
}

/// Estimate the box of a single line of text at `font_size`.
#[must_use]
pub fn estimate_text_size(content: &str, font_size: f64) -> (f64, f64) {
    let glyphs = content.chars().count().max(1) as f64;
    (glyphs * font_size * TEXT_ADVANCE_RATIO, font_size * TEXT_LINE_HEIGHT)
}

fn points_bounds(points: &[Point], padding: f64) -> Rect {
    let Some(first) = points.first() else {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x - padding, min_y - padding, max_x - min_x + padding * 2.0, max_y - min_y + padding * 2.0)
}

/// Sparse update for a scene object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSceneObject {
    /// New x position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New visibility, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

impl PartialSceneObject {
    /// A partial carrying the full bounds of `rect`.
    #[must_use]
    pub fn from_bounds(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Default::default()
        }
    }
}

/// Typed access to common props fields from a `SceneObject.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    /// Wrap a reference to a `props` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Fill color as a hex string. Defaults to `DEFAULT_FILL` when absent.
    #[must_use]
    pub fn fill(&self) -> &str {
        self.value
            .get("fill")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_FILL)
    }

    /// Stroke color as a hex string. Defaults to `DEFAULT_STROKE` when absent.
    #[must_use]
    pub fn stroke(&self) -> &str {
        self.value
            .get("stroke")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_STROKE)
    }

    /// Stroke width in world units. Defaults to `1.0` when absent.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.value
            .get("stroke_width")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0)
    }

    /// Label text. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Font size in world units. Defaults to `DEFAULT_FONT_SIZE` when absent.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.value
            .get("font_size")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }
}

/// Ordered collection of scene objects with a single active selection.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
    next_z: i64,
    active: Option<ObjectId>,
    background: String,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty scene with the default background.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Vec::new(), next_z: 0, active: None, background: DEFAULT_BACKGROUND.to_owned() }
    }

    /// Append an object on top of the stack and make it the active selection.
    pub fn add(&mut self, mut obj: SceneObject) -> ObjectId {
        obj.z_index = self.next_z;
        self.next_z += 1;
        let id = obj.id;
        self.objects.push(obj);
        self.active = Some(id);
        id
    }

    /// Remove an object by id, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.id == *id)?;
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Some(self.objects.remove(idx))
    }

    /// Remove every object and reset the background. Takes effect unconditionally.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.active = None;
        DEFAULT_BACKGROUND.clone_into(&mut self.background);
    }

    /// Set or clear the active selection.
    ///
    /// Returns `false` (and leaves the selection unchanged) when `id` is not a
    /// selectable object in this scene.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            None => {
                self.active = None;
                true
            }
            Some(id) => {
                let selectable = self.get(&id).is_some_and(|o| o.selectable);
                if selectable {
                    self.active = Some(id);
                }
                selectable
            }
        }
    }

    /// Move an object to the top of the stack. Returns false if it doesn't exist.
    pub fn bring_to_front(&mut self, id: &ObjectId) -> bool {
        let Some(idx) = self.objects.iter().position(|o| o.id == *id) else {
            return false;
        };
        let mut obj = self.objects.remove(idx);
        obj.z_index = self.next_z;
        self.next_z += 1;
        self.objects.push(obj);
        true
    }

    /// The currently active object id, if any.
    #[must_use]
    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Return a reference to an object by id.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == *id)
    }

    /// Return a mutable reference to an object by id.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == *id)
    }

    /// Apply a partial update to an existing object. Returns false if the object doesn't exist.
    pub fn apply_partial(&mut self, id: &ObjectId, partial: &PartialSceneObject) -> bool {
        let Some(obj) = self.get_mut(id) else {
            return false;
        };
        let current = obj.bounds();
        let rect = Rect::new(
            partial.x.unwrap_or(current.x),
            partial.y.unwrap_or(current.y),
            partial.width.unwrap_or(current.width),
            partial.height.unwrap_or(current.height),
        );
        if rect != current {
            obj.set_bounds(rect);
        }
        if let Some(visible) = partial.visible {
            obj.visible = visible;
        }
        if let Some(ref props) = partial.props {
            let Some(incoming) = props.as_object() else {
                return false;
            };

            if !obj.props.is_object() {
                obj.props = serde_json::json!({});
            }

            if let Some(existing) = obj.props.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        true
    }

    /// All objects in draw order (bottom first).
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Ids of all objects of `kind`, in draw order.
    #[must_use]
    pub fn ids_of_kind(&self, kind: ObjectKind) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.id)
            .collect()
    }

    /// Background color as a hex string.
    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Number of objects currently in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the scene contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
