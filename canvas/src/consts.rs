//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 5.0;

/// Wheel zoom base: each wheel event multiplies zoom by `WHEEL_ZOOM_BASE ^ delta_y`.
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Placement ───────────────────────────────────────────────────

/// Drags smaller than this (world units, either axis) place a default-sized shape instead.
pub const MIN_DRAG_SIZE: f64 = 4.0;

/// Side length of a rectangle or circle placed with a click instead of a drag.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Width of a generated image placed without a target frame, in world units.
pub const DEFAULT_RESULT_WIDTH: f64 = 512.0;

/// Smallest width/height an object can be resized to.
pub const MIN_OBJECT_SIZE: f64 = 1.0;

// ── Styles ──────────────────────────────────────────────────────

/// Default fill for rectangles and circles.
pub const DEFAULT_FILL: &str = "#D94B4B";

/// Default outline color.
pub const DEFAULT_STROKE: &str = "#1F1A17";

/// Default brush color.
pub const BRUSH_COLOR: &str = "#1F1A17";

/// Default brush width in world units.
pub const BRUSH_WIDTH: f64 = 4.0;

/// Generation frame outline color.
pub const FRAME_STROKE: &str = "#2F80ED";

/// Surface background after a clear.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

// ── Text ────────────────────────────────────────────────────────

/// Content of a freshly placed text object.
pub const DEFAULT_TEXT: &str = "Text";

/// Font size of a freshly placed text object, in world units.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Average glyph advance as a fraction of the font size, used to estimate text bounds.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

/// Line height as a multiple of the font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;
