use crate::camera::{Camera, Point, Rect};
use crate::doc::{ImagePayload, ObjectId, ObjectKind, PartialSceneObject, Props, SceneGraph, SceneObject, estimate_text_size};
use crate::error::CaptureError;
use crate::frame::{CapturedRegion, GenerationFrameManager};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render::Rasterizer;
use crate::tools::handler_for;
use crate::viewport::ViewportController;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated(ObjectId),
    ObjectUpdated { id: ObjectId, fields: PartialSceneObject },
    ObjectDeleted { id: ObjectId },
    /// The host should open a text editor for `id`, pre-filled with `text`.
    EditTextRequested { id: ObjectId, text: String },
    SelectionChanged(Option<ObjectId>),
    ToolChanged(Tool),
    SetCursor(String),
    RenderNeeded,
}

/// The canvas engine: scene, viewport, tool state, and generation frame.
///
/// Holds no host resources, so every entry point can be driven from tests.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub scene: SceneGraph,
    pub viewport: ViewportController,
    pub ui: UiState,
    pub input: InputState,
    pub frames: GenerationFrameManager,
}

impl Engine {
    /// Create an engine for a surface of `width` x `height` pixels.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { viewport: ViewportController::new(width, height), ..Self::default() }
    }

    // --- Tool / text ---

    /// Switch tools. In-flight drafts and strokes are dropped; moves and
    /// resizes keep whatever has been applied so far. Re-selecting the
    /// current tool does nothing.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if tool == self.ui.tool {
            return Vec::new();
        }
        let mut actions = self.reset_gesture();
        self.ui.tool = tool;
        let handler = handler_for(tool);
        if !handler.allows_selection() && self.scene.active().is_some() {
            self.scene.set_active(None);
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::ToolChanged(tool));
        actions.push(Action::SetCursor(handler.cursor().to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace the content of a text object and refit its bounds.
    pub fn set_text(&mut self, id: &ObjectId, text: &str) -> Vec<Action> {
        let Some(obj) = self.scene.get(id).filter(|o| o.kind == ObjectKind::Text) else {
            return Vec::new();
        };
        let (width, height) = estimate_text_size(text, Props::new(&obj.props).font_size());
        let partial = PartialSceneObject {
            width: Some(width),
            height: Some(height),
            props: Some(serde_json::json!({ "text": text })),
            ..Default::default()
        };
        self.scene.apply_partial(id, &partial);
        vec![Action::ObjectUpdated { id: *id, fields: partial }, Action::RenderNeeded]
    }

    // --- Scene ---

    /// Remove every object. Confirmation is the caller's job.
    pub fn clear(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.viewport.end_pan();
        self.scene.clear();
        self.frames.clear();
        tracing::debug!("scene cleared");
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Install a new generation frame covering `rect` (world units).
    pub fn set_frame(&mut self, rect: Rect) -> Vec<Action> {
        let mut actions = self.reset_gesture();
        let placed = self.frames.set_frame(&mut self.scene, rect);
        actions.extend(placed.evicted.into_iter().map(|id| Action::ObjectDeleted { id }));
        actions.push(Action::ObjectCreated(placed.id));
        actions.push(Action::SelectionChanged(Some(placed.id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Export the active frame's region (or the whole surface).
    ///
    /// # Errors
    ///
    /// See [`GenerationFrameManager::capture_region`].
    pub fn capture_region<R: Rasterizer + ?Sized>(&mut self, rasterizer: &R) -> Result<CapturedRegion, CaptureError> {
        self.frames.capture_region(&mut self.scene, &self.viewport, rasterizer)
    }

    /// Insert a generated image, fitted to the active frame if there is one.
    pub fn place_result(&mut self, payload: ImagePayload) -> (ObjectId, Vec<Action>) {
        let target = self.frames.active_id();
        let id = self.frames.place_result(&mut self.scene, &self.viewport, payload, target);
        (id, vec![Action::ObjectCreated(id), Action::SelectionChanged(Some(id)), Action::RenderNeeded])
    }

    // --- Viewport ---

    /// The host surface changed size. Pan and zoom are preserved.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        if self.viewport.resize(width, height) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        match button {
            Button::Secondary => Vec::new(),
            Button::Middle => self.begin_pan(screen_pt),
            Button::Primary if modifiers.alt => self.begin_pan(screen_pt),
            Button::Primary => {
                let world = self.viewport.camera().screen_to_world(screen_pt);
                handler_for(self.ui.tool).pointer_down(self, world, screen_pt)
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning => {
                if self.viewport.continue_pan(screen_pt.x, screen_pt.y) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            _ => {
                let world = self.viewport.camera().screen_to_world(screen_pt);
                handler_for(self.ui.tool).pointer_move(self, world, screen_pt)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning => {
                self.input = InputState::Idle;
                self.viewport.end_pan();
                vec![Action::SetCursor(handler_for(self.ui.tool).cursor().to_owned())]
            }
            _ => {
                let world = self.viewport.camera().screen_to_world(screen_pt);
                let actions = handler_for(self.ui.tool).pointer_up(self, world, screen_pt);
                self.input = InputState::Idle;
                actions
            }
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if self.viewport.zoom_at(screen_pt.x, screen_pt.y, delta.dy) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => self.cancel_gesture(),
            "Enter" => {
                let Some(obj) = self.scene.active().and_then(|id| self.scene.get(&id)) else {
                    return Vec::new();
                };
                if obj.kind != ObjectKind::Text {
                    return Vec::new();
                }
                vec![Action::EditTextRequested { id: obj.id, text: Props::new(&obj.props).text().to_owned() }]
            }
            _ => Vec::new(),
        }
    }

    // --- Queries ---

    /// The currently selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.scene.active()
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.viewport.camera()
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    // --- Gesture plumbing shared with tool handlers ---

    pub(crate) fn begin_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.viewport.begin_pan(screen_pt.x, screen_pt.y);
        self.input = InputState::Panning;
        vec![Action::SetCursor("grabbing".to_owned())]
    }

    /// Return to select after a one-shot placement.
    pub(crate) fn finish_one_shot(&mut self) -> Vec<Action> {
        if !self.ui.tool.is_one_shot() {
            return vec![Action::RenderNeeded];
        }
        self.ui.tool = Tool::Select;
        vec![
            Action::ToolChanged(Tool::Select),
            Action::SetCursor(handler_for(Tool::Select).cursor().to_owned()),
            Action::RenderNeeded,
        ]
    }

    /// Report the final bounds of a finished move or resize, if they changed.
    pub(crate) fn settle_transform(&self, gesture: &InputState) -> Option<Action> {
        let (InputState::DraggingObject { id, orig, .. } | InputState::ResizingObject { id, orig, .. }) = gesture else {
            return None;
        };
        let bounds = self.scene.get(id)?.bounds();
        (bounds != *orig).then(|| Action::ObjectUpdated { id: *id, fields: PartialSceneObject::from_bounds(bounds) })
    }

    /// End the current gesture without rolling anything back. Drafts are discarded.
    fn reset_gesture(&mut self) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        if matches!(gesture, InputState::Panning) {
            self.viewport.end_pan();
        }
        self.settle_transform(&gesture).into_iter().collect()
    }

    /// Abort the current gesture, restoring any moved or resized object, and deselect.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        let mut actions = Vec::new();
        match gesture {
            InputState::Panning => {
                self.viewport.end_pan();
                actions.push(Action::SetCursor(handler_for(self.ui.tool).cursor().to_owned()));
            }
            InputState::DraggingObject { id, orig, .. } | InputState::ResizingObject { id, orig, .. } => {
                if let Some(obj) = self.scene.get_mut(&id) {
                    obj.set_bounds(orig);
                }
            }
            InputState::Idle | InputState::DrawingShape { .. } | InputState::Stroking { .. } => {}
        }
        if self.scene.active().is_some() {
            self.scene.set_active(None);
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let Some(id) = self.scene.active() else {
            return Vec::new();
        };
        if self.scene.remove(&id).is_none() {
            return Vec::new();
        }
        self.frames.forget(&id);
        vec![Action::ObjectDeleted { id }, Action::SelectionChanged(None), Action::RenderNeeded]
    }
}
