//! Per-tool pointer handlers.
//!
//! Each [`Tool`] maps to one stateless [`ToolHandler`]; gesture state lives in
//! [`crate::input::InputState`] on the engine. [`handler_for`] is the only
//! dispatch point. Panning that was started by the middle button or Alt is
//! driven by the engine itself and never reaches a handler.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_SHAPE_SIZE, DEFAULT_TEXT, MIN_DRAG_SIZE};
use crate::doc::{ObjectId, ObjectKind, SceneObject};
use crate::engine::{Action, Engine};
use crate::hit::{HitPart, hit_test};
use crate::input::{InputState, Tool};

/// Pointer behaviour of a single tool.
pub trait ToolHandler: Sync {
    fn tool(&self) -> Tool;

    /// Host cursor name while this tool is active.
    fn cursor(&self) -> &'static str;

    /// Whether clicking objects may change the selection.
    fn allows_selection(&self) -> bool {
        true
    }

    fn pointer_down(&self, engine: &mut Engine, world: Point, screen: Point) -> Vec<Action>;

    fn pointer_move(&self, _engine: &mut Engine, _world: Point, _screen: Point) -> Vec<Action> {
        Vec::new()
    }

    fn pointer_up(&self, _engine: &mut Engine, _world: Point, _screen: Point) -> Vec<Action> {
        Vec::new()
    }
}

static SELECT: SelectTool = SelectTool;
static HAND: HandTool = HandTool;
static BRUSH: BrushTool = BrushTool;
static RECTANGLE: ShapeTool = ShapeTool { kind: ObjectKind::Rect, tool: Tool::Rectangle };
static CIRCLE: ShapeTool = ShapeTool { kind: ObjectKind::Circle, tool: Tool::Circle };
static TEXT: TextTool = TextTool;

/// The handler responsible for `tool`.
#[must_use]
pub fn handler_for(tool: Tool) -> &'static dyn ToolHandler {
    match tool {
        Tool::Select => &SELECT,
        Tool::Hand => &HAND,
        Tool::Brush => &BRUSH,
        Tool::Rectangle => &RECTANGLE,
        Tool::Circle => &CIRCLE,
        Tool::Text => &TEXT,
    }
}

/// Append the actions for a freshly inserted object.
fn created(actions: &mut Vec<Action>, id: ObjectId) {
    actions.push(Action::ObjectCreated(id));
    actions.push(Action::SelectionChanged(Some(id)));
}

// =============================================================
// Select
// =============================================================

/// Picks, moves, and resizes objects.
pub struct SelectTool;

impl ToolHandler for SelectTool {
    fn tool(&self) -> Tool {
        Tool::Select
    }

    fn cursor(&self) -> &'static str {
        "default"
    }

    fn pointer_down(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let camera = engine.viewport.camera();
        let Some(hit) = hit_test(world, &engine.scene, &camera) else {
            if engine.scene.active().is_some() {
                engine.scene.set_active(None);
                return vec![Action::SelectionChanged(None), Action::RenderNeeded];
            }
            return Vec::new();
        };
        let Some(orig) = engine.scene.get(&hit.object_id).map(SceneObject::bounds) else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if engine.scene.active() != Some(hit.object_id) {
            engine.scene.set_active(Some(hit.object_id));
            actions.push(Action::SelectionChanged(Some(hit.object_id)));
        }
        engine.input = match hit.part {
            HitPart::Body => InputState::DraggingObject { id: hit.object_id, last_world: world, orig },
            HitPart::ResizeHandle(anchor) => {
                InputState::ResizingObject { id: hit.object_id, anchor, start_world: world, orig }
            }
        };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn pointer_move(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        match &mut engine.input {
            InputState::DraggingObject { id, last_world, .. } => {
                let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                *last_world = world;
                if let Some(obj) = engine.scene.get_mut(id) {
                    obj.translate(dx, dy);
                }
                vec![Action::RenderNeeded]
            }
            InputState::ResizingObject { id, anchor, start_world, orig } => {
                let next = anchor.apply(orig, world.x - start_world.x, world.y - start_world.y);
                if let Some(obj) = engine.scene.get_mut(id) {
                    obj.set_bounds(next);
                }
                vec![Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    fn pointer_up(&self, engine: &mut Engine, _world: Point, _screen: Point) -> Vec<Action> {
        let gesture = std::mem::take(&mut engine.input);
        engine.settle_transform(&gesture).into_iter().collect()
    }
}

// =============================================================
// Hand
// =============================================================

/// Pans the viewport. Objects cannot be selected.
pub struct HandTool;

impl ToolHandler for HandTool {
    fn tool(&self) -> Tool {
        Tool::Hand
    }

    fn cursor(&self) -> &'static str {
        "grab"
    }

    fn allows_selection(&self) -> bool {
        false
    }

    fn pointer_down(&self, engine: &mut Engine, _world: Point, screen: Point) -> Vec<Action> {
        engine.begin_pan(screen)
    }
}

// =============================================================
// Brush
// =============================================================

/// Records freehand strokes. The stroke enters the scene on pointer-up.
pub struct BrushTool;

impl ToolHandler for BrushTool {
    fn tool(&self) -> Tool {
        Tool::Brush
    }

    fn cursor(&self) -> &'static str {
        "crosshair"
    }

    fn pointer_down(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        engine.input = InputState::Stroking { points: vec![world] };
        Vec::new()
    }

    fn pointer_move(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let InputState::Stroking { points } = &mut engine.input else {
            return Vec::new();
        };
        if points.last() != Some(&world) {
            points.push(world);
        }
        vec![Action::RenderNeeded]
    }

    fn pointer_up(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let InputState::Stroking { mut points } = std::mem::take(&mut engine.input) else {
            return Vec::new();
        };
        if points.last() != Some(&world) {
            points.push(world);
        }
        let id = engine.scene.add(SceneObject::stroke(points));
        let mut actions = Vec::new();
        created(&mut actions, id);
        actions.push(Action::RenderNeeded);
        actions
    }
}

// =============================================================
// Rectangle / Circle
// =============================================================

/// Drags out a rectangle or circle, then returns to select.
pub struct ShapeTool {
    kind: ObjectKind,
    tool: Tool,
}

impl ToolHandler for ShapeTool {
    fn tool(&self) -> Tool {
        self.tool
    }

    fn cursor(&self) -> &'static str {
        "crosshair"
    }

    fn pointer_down(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        engine.input = InputState::DrawingShape { kind: self.kind, anchor_world: world, current_world: world };
        Vec::new()
    }

    fn pointer_move(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let InputState::DrawingShape { current_world, .. } = &mut engine.input else {
            return Vec::new();
        };
        *current_world = world;
        vec![Action::RenderNeeded]
    }

    fn pointer_up(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let mut gesture = std::mem::take(&mut engine.input);
        let InputState::DrawingShape { anchor_world, current_world, .. } = &mut gesture else {
            return Vec::new();
        };
        *current_world = world;
        let anchor = *anchor_world;
        let Some((kind, mut rect)) = gesture.draft_rect() else {
            return Vec::new();
        };
        if rect.width < MIN_DRAG_SIZE || rect.height < MIN_DRAG_SIZE {
            rect = Rect::new(anchor.x, anchor.y, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE);
        }
        let obj = match kind {
            ObjectKind::Circle => SceneObject::circle(rect),
            _ => SceneObject::rect(rect),
        };
        let id = engine.scene.add(obj);

        let mut actions = Vec::new();
        created(&mut actions, id);
        actions.extend(engine.finish_one_shot());
        actions
    }
}

// =============================================================
// Text
// =============================================================

/// Places a text label on click, then returns to select.
pub struct TextTool;

impl ToolHandler for TextTool {
    fn tool(&self) -> Tool {
        Tool::Text
    }

    fn cursor(&self) -> &'static str {
        "text"
    }

    fn pointer_down(&self, engine: &mut Engine, world: Point, _screen: Point) -> Vec<Action> {
        let id = engine.scene.add(SceneObject::text(world, DEFAULT_TEXT));
        let mut actions = Vec::new();
        created(&mut actions, id);
        actions.push(Action::EditTextRequested { id, text: DEFAULT_TEXT.to_owned() });
        actions.extend(engine.finish_one_shot());
        actions
    }
}
