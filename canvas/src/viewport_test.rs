#![allow(clippy::float_cmp)]

use super::*;

fn screen_of(vp: &ViewportController, world: Point) -> Point {
    vp.camera().world_to_screen(world)
}

// =============================================================
// zoom_at: clamping
// =============================================================

#[test]
fn zoom_in_hard_clamps_to_max() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.zoom_at(400.0, 300.0, -1_000_000.0);
    assert_eq!(vp.camera().zoom, ZOOM_MAX);
}

#[test]
fn zoom_out_hard_clamps_to_min() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.zoom_at(400.0, 300.0, 1_000_000.0);
    assert_eq!(vp.camera().zoom, ZOOM_MIN);
}

#[test]
fn zoom_stays_in_range_for_many_deltas() {
    let mut vp = ViewportController::new(800.0, 600.0);
    for delta in [-5000.0, 3.0, 250.0, -0.5, 9999.0, -9999.0, f64::INFINITY, f64::NEG_INFINITY] {
        vp.zoom_at(123.0, 45.0, delta);
        let z = vp.camera().zoom;
        assert!((ZOOM_MIN..=ZOOM_MAX).contains(&z), "zoom {z} out of range after delta {delta}");
    }
}

#[test]
fn zoom_uses_wheel_base() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.zoom_at(0.0, 0.0, -100.0);
    let expected = 0.999_f64.powf(-100.0);
    assert!((vp.camera().zoom - expected).abs() < 1e-12);
}

#[test]
fn zoom_nan_delta_is_ignored() {
    let mut vp = ViewportController::new(800.0, 600.0);
    assert!(!vp.zoom_at(10.0, 10.0, f64::NAN));
    assert_eq!(vp.camera().zoom, 1.0);
}

#[test]
fn zoom_at_bound_reports_no_change() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.zoom_at(0.0, 0.0, -1_000_000.0);
    assert!(!vp.zoom_at(0.0, 0.0, -10.0));
}

// =============================================================
// zoom_at: zoom-to-point
// =============================================================

#[test]
fn zoom_keeps_pointer_world_point_fixed() {
    let mut vp = ViewportController::new(800.0, 600.0);
    let pointer = Point::new(500.0, 400.0);
    let before = vp.camera().screen_to_world(pointer);

    vp.zoom_at(pointer.x, pointer.y, -250.0);

    let after = screen_of(&vp, before);
    assert!((after.x - pointer.x).abs() < 1e-9);
    assert!((after.y - pointer.y).abs() < 1e-9);
}

#[test]
fn zoom_keeps_pointer_fixed_with_existing_pan() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.set_camera(Camera { pan_x: -320.0, pan_y: 75.0, zoom: 2.5 });
    let pointer = Point::new(37.0, 512.0);
    let before = vp.camera().screen_to_world(pointer);

    vp.zoom_at(pointer.x, pointer.y, 180.0);

    let after = screen_of(&vp, before);
    assert!((after.x - pointer.x).abs() < 1e-9);
    assert!((after.y - pointer.y).abs() < 1e-9);
}

#[test]
fn zoom_keeps_pointer_fixed_when_clamped() {
    let mut vp = ViewportController::new(800.0, 600.0);
    let pointer = Point::new(640.0, 10.0);
    let before = vp.camera().screen_to_world(pointer);

    vp.zoom_at(pointer.x, pointer.y, -100_000.0);

    let after = screen_of(&vp, before);
    assert!((after.x - pointer.x).abs() < 1e-9);
    assert!((after.y - pointer.y).abs() < 1e-9);
}

// =============================================================
// Pan gesture
// =============================================================

#[test]
fn pan_translates_by_pointer_delta() {
    let mut vp = ViewportController::new(800.0, 600.0);
    assert!(vp.begin_pan(100.0, 100.0));
    assert!(vp.continue_pan(120.0, 110.0));
    assert_eq!(vp.camera().pan_x, 20.0);
    assert_eq!(vp.camera().pan_y, 10.0);
}

#[test]
fn pan_accumulates_across_moves() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.begin_pan(0.0, 0.0);
    vp.continue_pan(10.0, 5.0);
    vp.continue_pan(20.0, 15.0);
    assert_eq!(vp.camera().pan_x, 20.0);
    assert_eq!(vp.camera().pan_y, 15.0);
}

#[test]
fn pan_does_not_change_zoom() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.zoom_at(0.0, 0.0, -300.0);
    let zoom = vp.camera().zoom;
    vp.begin_pan(0.0, 0.0);
    vp.continue_pan(-40.0, 90.0);
    assert_eq!(vp.camera().zoom, zoom);
}

#[test]
fn continue_pan_without_begin_is_noop() {
    let mut vp = ViewportController::new(800.0, 600.0);
    assert!(!vp.continue_pan(50.0, 50.0));
    assert_eq!(vp.camera().pan_x, 0.0);
}

#[test]
fn second_begin_pan_is_ignored() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.begin_pan(0.0, 0.0);
    assert!(!vp.begin_pan(500.0, 500.0));
    vp.continue_pan(10.0, 0.0);
    assert_eq!(vp.camera().pan_x, 10.0);
}

#[test]
fn end_pan_stops_tracking() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.begin_pan(0.0, 0.0);
    assert!(vp.end_pan());
    assert!(!vp.is_panning());
    assert!(!vp.continue_pan(10.0, 10.0));
    assert!(!vp.end_pan());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_keeps_camera() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.set_camera(Camera { pan_x: 12.0, pan_y: -3.0, zoom: 1.5 });
    assert!(vp.resize(1024.0, 768.0));
    assert_eq!(vp.width(), 1024.0);
    assert_eq!(vp.height(), 768.0);
    assert_eq!(vp.camera().pan_x, 12.0);
    assert_eq!(vp.camera().pan_y, -3.0);
    assert_eq!(vp.camera().zoom, 1.5);
}

#[test]
fn resize_clamps_to_one_pixel() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.resize(0.0, -20.0);
    assert_eq!(vp.width(), 1.0);
    assert_eq!(vp.height(), 1.0);
}

#[test]
fn resize_same_size_reports_no_change() {
    let mut vp = ViewportController::new(800.0, 600.0);
    assert!(!vp.resize(800.0, 600.0));
}

#[test]
fn center_world_follows_camera() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.set_camera(Camera { pan_x: 400.0, pan_y: 300.0, zoom: 2.0 });
    assert_eq!(vp.center_world(), Point::new(0.0, 0.0));
}

#[test]
fn set_camera_clamps_zoom() {
    let mut vp = ViewportController::new(800.0, 600.0);
    vp.set_camera(Camera { pan_x: 0.0, pan_y: 0.0, zoom: 40.0 });
    assert_eq!(vp.camera().zoom, ZOOM_MAX);
}
