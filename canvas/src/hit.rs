#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{HANDLE_RADIUS_PX, MIN_OBJECT_SIZE};
use crate::doc::{ObjectId, ObjectKind, SceneGraph, SceneObject};

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// World position of this handle on `rect`.
    #[must_use]
    pub fn position(self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width * 0.5;
        let cy = rect.y + rect.height * 0.5;
        match self {
            Self::N => Point::new(cx, rect.y),
            Self::Ne => Point::new(rect.right(), rect.y),
            Self::E => Point::new(rect.right(), cy),
            Self::Se => Point::new(rect.right(), rect.bottom()),
            Self::S => Point::new(cx, rect.bottom()),
            Self::Sw => Point::new(rect.x, rect.bottom()),
            Self::W => Point::new(rect.x, cy),
            Self::Nw => Point::new(rect.x, rect.y),
        }
    }

    /// Resize `orig` by dragging this handle by `(dx, dy)` world units.
    ///
    /// The opposite edge stays put; sizes never drop below `MIN_OBJECT_SIZE`.
    #[must_use]
    pub fn apply(self, orig: &Rect, dx: f64, dy: f64) -> Rect {
        let mut left = orig.x;
        let mut top = orig.y;
        let mut right = orig.right();
        let mut bottom = orig.bottom();

        if matches!(self, Self::W | Self::Nw | Self::Sw) {
            left = (left + dx).min(right - MIN_OBJECT_SIZE);
        }
        if matches!(self, Self::E | Self::Ne | Self::Se) {
            right = (right + dx).max(left + MIN_OBJECT_SIZE);
        }
        if matches!(self, Self::N | Self::Ne | Self::Nw) {
            top = (top + dy).min(bottom - MIN_OBJECT_SIZE);
        }
        if matches!(self, Self::S | Self::Se | Self::Sw) {
            bottom = (bottom + dy).max(top + MIN_OBJECT_SIZE);
        }
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Test which object (if any) is under `world_pt`, checking the active object's handles first.
///
/// Only visible, selectable objects are considered. Objects are tested top-most first.
#[must_use]
pub fn hit_test(world_pt: Point, scene: &SceneGraph, camera: &Camera) -> Option<Hit> {
    let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);

    if let Some(active) = scene.active().and_then(|id| scene.get(&id)) {
        if is_pickable(active) {
            let bounds = active.bounds();
            for anchor in ResizeAnchor::ALL {
                let handle = anchor.position(&bounds);
                if (handle.x - world_pt.x).abs() <= slop && (handle.y - world_pt.y).abs() <= slop {
                    return Some(Hit { object_id: active.id, part: HitPart::ResizeHandle(anchor) });
                }
            }
        }
    }

    scene
        .objects()
        .iter()
        .rev()
        .filter(|o| is_pickable(o))
        .find(|o| body_contains(o, world_pt))
        .map(|o| Hit { object_id: o.id, part: HitPart::Body })
}

fn is_pickable(obj: &SceneObject) -> bool {
    obj.visible && obj.selectable
}

fn body_contains(obj: &SceneObject, pt: Point) -> bool {
    let bounds = obj.bounds();
    match obj.kind {
        ObjectKind::Circle => {
            let rx = bounds.width * 0.5;
            let ry = bounds.height * 0.5;
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let c = bounds.center();
            let nx = (pt.x - c.x) / rx;
            let ny = (pt.y - c.y) / ry;
            nx * nx + ny * ny <= 1.0
        }
        _ => bounds.contains(pt),
    }
}
