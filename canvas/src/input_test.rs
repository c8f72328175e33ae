use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_all_variants_distinct() {
    for (i, a) in Tool::ALL.iter().enumerate() {
        for (j, b) in Tool::ALL.iter().enumerate() {
            if i == j {
                assert_eq!(a, b);
            } else {
                assert_ne!(a, b);
            }
        }
    }
}

#[test]
fn one_shot_tools() {
    assert!(Tool::Rectangle.is_one_shot());
    assert!(Tool::Circle.is_one_shot());
    assert!(Tool::Text.is_one_shot());
    assert!(!Tool::Select.is_one_shot());
    assert!(!Tool::Hand.is_one_shot());
    assert!(!Tool::Brush.is_one_shot());
}

#[test]
fn tool_names_round_trip_through_from_str() {
    for tool in Tool::ALL {
        assert_eq!(tool.name().parse::<Tool>(), Ok(tool));
    }
}

#[test]
fn tool_from_str_is_case_insensitive() {
    assert_eq!("  Brush ".parse::<Tool>(), Ok(Tool::Brush));
}

#[test]
fn tool_from_str_rejects_unknown() {
    assert_eq!("lasso".parse::<Tool>(), Err(UnknownTool("lasso".into())));
}

#[test]
fn tool_display_is_name() {
    assert_eq!(Tool::Rectangle.to_string(), "rectangle");
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(matches!(state, InputState::Idle));
    assert!(!state.is_active());
}

#[test]
fn stroking_is_active() {
    let state = InputState::Stroking { points: vec![Point::new(0.0, 0.0)] };
    assert!(state.is_active());
}

#[test]
fn draft_rect_normalizes_corners() {
    let state = InputState::DrawingShape {
        kind: ObjectKind::Rect,
        anchor_world: Point::new(100.0, 100.0),
        current_world: Point::new(40.0, 160.0),
    };
    let (kind, rect) = state.draft_rect().unwrap();
    assert_eq!(kind, ObjectKind::Rect);
    assert_eq!(rect, Rect::new(40.0, 100.0, 60.0, 60.0));
}

#[test]
fn draft_rect_none_when_not_drawing() {
    assert!(InputState::Panning.draft_rect().is_none());
}
