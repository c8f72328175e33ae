//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to compute incremental deltas and
//! commit the final scene mutation on release.
//!
//! Draft shapes and in-progress strokes exist only inside `InputState`. The
//! scene is touched once, on pointer-up, so abandoning a gesture (tool switch,
//! Escape) can never leave a partial object behind.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use crate::camera::{Point, Rect};
use crate::doc::{ObjectId, ObjectKind};
use crate::hit::ResizeAnchor;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Pan the surface; object selection is disabled.
    Hand,
    /// Freehand brush strokes.
    Brush,
    /// Place a rectangle.
    Rectangle,
    /// Place a circle.
    Circle,
    /// Place a text label.
    Text,
}

impl Tool {
    pub const ALL: [Self; 6] = [Self::Select, Self::Hand, Self::Brush, Self::Rectangle, Self::Circle, Self::Text];

    /// Whether the tool places a single object and then hands control back to `Select`.
    #[must_use]
    pub fn is_one_shot(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Text)
    }

    /// Lowercase name used by hosts and the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Hand => "hand",
            Self::Brush => "brush",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a tool name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTool(s.to_owned()))
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held. Pointer-down with Alt pans regardless of tool.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click). Always pans.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// commit on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The surface is being panned. The pan anchor lives in the viewport controller.
    Panning,
    /// The user is moving an existing object.
    DraggingObject {
        /// Id of the object being dragged.
        id: ObjectId,
        /// World-space position of the pointer at the previous event.
        last_world: Point,
        /// Object bounds at the start of the drag, restored on cancel.
        orig: Rect,
    },
    /// The user is resizing an object by dragging one of its eight handles.
    ResizingObject {
        /// Id of the object being resized.
        id: ObjectId,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// World-space pointer position at the start of the resize.
        start_world: Point,
        /// Object bounds at the start of the resize, restored on cancel.
        orig: Rect,
    },
    /// The user is dragging out a new shape. Nothing is in the scene yet.
    DrawingShape {
        /// Kind of shape that will be committed.
        kind: ObjectKind,
        /// The world-space corner where the drag started.
        anchor_world: Point,
        /// The world-space pointer position of the latest move.
        current_world: Point,
    },
    /// The user is drawing a freehand stroke. Nothing is in the scene yet.
    Stroking {
        /// Points captured so far, in world coordinates.
        points: Vec<Point>,
    },
}

impl InputState {
    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The draft rectangle of an in-progress shape, if any.
    #[must_use]
    pub fn draft_rect(&self) -> Option<(ObjectKind, Rect)> {
        match self {
            Self::DrawingShape { kind, anchor_world, current_world } => {
                Some((*kind, Rect::from_corners(*anchor_world, *current_world)))
            }
            _ => None,
        }
    }
}
