use super::*;
use crate::doc::{ImagePayload, PartialSceneObject};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FILL: Rgba<u8> = Rgba([0xD9, 0x4B, 0x4B, 255]);
const STROKE: Rgba<u8> = Rgba([0x1F, 0x1A, 0x17, 255]);

fn white_scene() -> SceneGraph {
    let mut scene = SceneGraph::new();
    scene.set_background("#FFFFFF");
    scene
}

/// Channel-wise comparison allowing for rounding in the blend pipeline.
fn near(actual: Rgba<u8>, expected: Rgba<u8>) -> bool {
    actual.0.iter().zip(expected.0).all(|(a, e)| a.abs_diff(e) <= 2)
}

// =============================================================
// Surface validation
// =============================================================

#[test]
fn zero_surface_is_rejected() {
    let err = SoftwareRasterizer.rasterize(&white_scene(), &Camera::default(), 0, 10).unwrap_err();
    assert_eq!(err, RenderError::InvalidSurface { width: 0, height: 10 });
}

#[test]
fn oversized_surface_is_rejected() {
    let err = SoftwareRasterizer.rasterize(&white_scene(), &Camera::default(), 100_000, 100_000).unwrap_err();
    assert!(matches!(err, RenderError::InvalidSurface { .. }));
}

#[test]
fn empty_scene_is_background() {
    let mut scene = SceneGraph::new();
    scene.set_background("#102030");
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 4, 3).unwrap();
    assert_eq!((img.width(), img.height()), (4, 3));
    assert!(img.pixels().all(|p| *p == Rgba([0x10, 0x20, 0x30, 255])));
}

#[test]
fn unparseable_background_falls_back_to_white() {
    let mut scene = SceneGraph::new();
    scene.set_background("teal");
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 2, 2).unwrap();
    assert_eq!(*img.get_pixel(0, 0), WHITE);
}

// =============================================================
// Objects
// =============================================================

#[test]
fn rect_fills_its_screen_bounds() {
    let mut scene = white_scene();
    scene.add(SceneObject::rect(Rect::new(2.0, 2.0, 6.0, 6.0)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 10, 10).unwrap();
    assert!(near(*img.get_pixel(5, 5), FILL));
    assert_eq!(*img.get_pixel(0, 0), WHITE);
    assert_eq!(*img.get_pixel(9, 9), WHITE);
}

#[test]
fn rect_outline_is_anti_aliased() {
    let mut scene = white_scene();
    scene.add(SceneObject::rect(Rect::new(2.0, 2.0, 6.0, 6.0)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 10, 10).unwrap();
    // The one-unit outline straddles x = 2, half covering the pixel outside it.
    let edge = *img.get_pixel(1, 5);
    assert!(!near(edge, WHITE) && !near(edge, STROKE), "edge pixel {edge:?}");
}

#[test]
fn hidden_objects_are_skipped() {
    let mut scene = white_scene();
    let id = scene.add(SceneObject::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
    scene.apply_partial(&id, &PartialSceneObject { visible: Some(false), ..Default::default() });
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 10, 10).unwrap();
    assert!(img.pixels().all(|p| *p == WHITE));
}

#[test]
fn camera_zoom_scales_objects() {
    let mut scene = white_scene();
    scene.add(SceneObject::rect(Rect::new(0.0, 0.0, 5.0, 5.0)));
    let camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    let img = SoftwareRasterizer.rasterize(&scene, &camera, 20, 20).unwrap();
    assert!(near(*img.get_pixel(8, 8), FILL));
    assert_eq!(*img.get_pixel(12, 12), WHITE);
}

#[test]
fn camera_pan_offsets_objects() {
    let mut scene = white_scene();
    scene.add(SceneObject::rect(Rect::new(0.0, 0.0, 4.0, 4.0)));
    let camera = Camera { pan_x: 10.0, pan_y: 10.0, zoom: 1.0 };
    let img = SoftwareRasterizer.rasterize(&scene, &camera, 20, 20).unwrap();
    assert_eq!(*img.get_pixel(2, 2), WHITE);
    assert!(near(*img.get_pixel(12, 12), FILL));
}

#[test]
fn circle_leaves_corners_empty() {
    let mut scene = white_scene();
    scene.add(SceneObject::circle(Rect::new(0.0, 0.0, 20.0, 20.0)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert_eq!(*img.get_pixel(0, 0), WHITE);
    assert!(near(*img.get_pixel(10, 10), FILL));
}

#[test]
fn circle_edge_is_anti_aliased() {
    let mut scene = white_scene();
    scene.add(SceneObject::circle(Rect::new(0.0, 0.0, 20.0, 20.0)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    // The outline crosses this pixel diagonally.
    let edge = *img.get_pixel(2, 2);
    assert!(!near(edge, WHITE) && !near(edge, STROKE) && !near(edge, FILL), "edge pixel {edge:?}");
}

#[test]
fn stroke_paints_along_its_path() {
    let mut scene = white_scene();
    scene.add(SceneObject::stroke(vec![Point::new(2.0, 10.5), Point::new(18.0, 10.5)]));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert!(near(*img.get_pixel(10, 10), STROKE));
    assert_eq!(*img.get_pixel(10, 0), WHITE);
}

#[test]
fn single_point_stroke_paints_a_dot() {
    let mut scene = white_scene();
    scene.add(SceneObject::stroke(vec![Point::new(10.0, 10.0)]));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert_ne!(*img.get_pixel(10, 10), WHITE);
    assert_eq!(*img.get_pixel(0, 0), WHITE);
}

#[test]
fn image_is_stretched_to_bounds() {
    let mut scene = white_scene();
    let pixels = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
    scene.add(SceneObject::image(Rect::new(5.0, 5.0, 10.0, 10.0), ImagePayload::new(pixels, None)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert!(near(*img.get_pixel(10, 10), Rgba([0, 0, 255, 255])));
    assert!(near(*img.get_pixel(14, 14), Rgba([0, 0, 255, 255])));
    assert_eq!(*img.get_pixel(16, 16), WHITE);
}

#[test]
fn zoomed_image_samples_only_the_visible_surface() {
    let mut scene = white_scene();
    let pixels = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 255, 255]));
    scene.add(SceneObject::image(Rect::new(0.0, 0.0, 1600.0, 1600.0), ImagePayload::new(pixels, None)));
    // 8000x8000 screen pixels on screen, far beyond the surface cap.
    let camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 5.0 };

    let started = std::time::Instant::now();
    let img = SoftwareRasterizer.rasterize(&scene, &camera, 64, 64).unwrap();

    assert!(img.pixels().all(|p| near(*p, Rgba([0, 0, 255, 255]))));
    assert!(started.elapsed() < std::time::Duration::from_secs(1), "took {:?}", started.elapsed());
}

#[test]
fn frame_draws_outline_only() {
    let mut scene = white_scene();
    scene.add(SceneObject::frame(Rect::new(0.0, 0.0, 20.0, 20.0)));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert!(near(*img.get_pixel(0, 10), Rgba([0x2F, 0x80, 0xED, 255])));
    assert_eq!(*img.get_pixel(10, 10), WHITE);
}

#[test]
fn text_is_not_painted() {
    let mut scene = white_scene();
    scene.add(SceneObject::text(Point::new(0.0, 0.0), "hello"));
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 20, 20).unwrap();
    assert!(img.pixels().all(|p| *p == WHITE));
}

#[test]
fn later_objects_paint_over_earlier_ones() {
    let mut scene = white_scene();
    let below = scene.add(SceneObject::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
    let above = scene.add(SceneObject::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
    scene.apply_partial(&below, &PartialSceneObject { props: Some(serde_json::json!({"fill": "#00FF00"})), ..Default::default() });
    scene.apply_partial(&above, &PartialSceneObject { props: Some(serde_json::json!({"fill": "#0000FF"})), ..Default::default() });
    let img = SoftwareRasterizer.rasterize(&scene, &Camera::default(), 10, 10).unwrap();
    assert!(near(*img.get_pixel(5, 5), Rgba([0, 0, 255, 255])));
}

// =============================================================
// Colors
// =============================================================

#[test]
fn parse_hex_color_accepts_rgb_and_rgba() {
    assert_eq!(parse_hex_color("#FF8000"), Some(Rgba([255, 128, 0, 255])));
    assert_eq!(parse_hex_color("#ff800080"), Some(Rgba([255, 128, 0, 128])));
}

#[test]
fn parse_hex_color_rejects_garbage() {
    assert_eq!(parse_hex_color("FF8000"), None);
    assert_eq!(parse_hex_color("#FF80"), None);
    assert_eq!(parse_hex_color("#GG8000"), None);
    assert_eq!(parse_hex_color("#ÿÿÿ"), None);
}
