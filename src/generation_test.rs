use serde_json::json;

use super::*;

// =============================================================================
// DEFAULTS
// =============================================================================

#[test]
fn image_body_carries_default_size() {
    let body = ImageRequest::new("a red fox").to_body().unwrap();
    assert_eq!(body, json!({ "prompt": "a red fox", "size": "1024x1024" }));
}

#[test]
fn video_body_carries_default_size_and_duration() {
    let body = VideoRequest::new("waves").to_body().unwrap();
    assert_eq!(body, json!({ "prompt": "waves", "size": "1024x1024", "duration": 5 }));
}

#[test]
fn veo_always_sends_explicit_size_and_duration() {
    let body = VideoRequest::veo("waves").to_body().unwrap();
    assert_eq!(body, json!({ "prompt": "waves", "size": "1920x1080", "duration": 10 }));
    assert_eq!(<VideoRequest as GenerationRequest>::PATH, "/generate-video");
}

#[test]
fn music_body_carries_default_duration() {
    let body = MusicRequest::new("lofi").to_body().unwrap();
    assert_eq!(body, json!({ "prompt": "lofi", "duration": 30 }));
}

#[test]
fn avatar_defaults_prompt() {
    let body = AvatarRequest::new("hello there").to_body().unwrap();
    assert_eq!(body, json!({ "prompt": "avatar", "text": "hello there" }));
}

#[test]
fn endpoints() {
    assert_eq!(ImageRequest::PATH, "/generate-image");
    assert_eq!(MusicRequest::PATH, "/generate-music");
    assert_eq!(AvatarRequest::PATH, "/generate-avatar");
    assert_eq!(CanvasRequest::PATH, "/generate-canvas");
    assert_eq!(RechargeRequest::PATH, "/payment/recharge");
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn blank_prompts_are_rejected() {
    assert!(matches!(ImageRequest::new("   ").validate(), Err(GenerationError::Validation(_))));
    assert!(matches!(VideoRequest::new("").validate(), Err(GenerationError::Validation(_))));
    assert!(matches!(MusicRequest::new("\n").validate(), Err(GenerationError::Validation(_))));
    assert!(matches!(AvatarRequest::new(" ").validate(), Err(GenerationError::Validation(_))));
}

#[test]
fn validation_message_names_field() {
    let err = AvatarRequest::new("").validate().unwrap_err();
    assert_eq!(err, GenerationError::Validation("text must not be empty".into()));
}

#[test]
fn zero_duration_is_rejected() {
    let mut video = VideoRequest::new("x");
    video.duration = 0;
    assert!(video.validate().is_err());

    let mut music = MusicRequest::new("x");
    music.duration = 0;
    assert!(music.validate().is_err());
}

#[test]
fn canvas_requires_png_data_url() {
    assert!(CanvasRequest::new("add sunglasses", "data:image/png;base64,iVBORw0KGgo=").validate().is_ok());
    assert!(CanvasRequest::new("add sunglasses", "data:image/png;base64,").validate().is_err());
    assert!(CanvasRequest::new("add sunglasses", "data:image/jpeg;base64,AAAA").validate().is_err());
    assert!(CanvasRequest::new("", "data:image/png;base64,AAAA").validate().is_err());
}

#[test]
fn recharge_amount_must_be_positive() {
    assert!(RechargeRequest::new(10.0).validate().is_ok());
    assert!(RechargeRequest::new(0.0).validate().is_err());
    assert!(RechargeRequest::new(-5.0).validate().is_err());
    assert!(RechargeRequest::new(f64::NAN).validate().is_err());
}

#[test]
fn to_body_validates_first() {
    assert!(ImageRequest::new("").to_body().is_err());
}

// =============================================================================
// RESULTS
// =============================================================================

#[test]
fn parses_results_with_optional_message() {
    let img: ImageResult = parse_result(json!({ "image_url": "/static/a.png", "message": "ok" })).unwrap();
    assert_eq!(img.image_url, "/static/a.png");
    assert_eq!(img.message.as_deref(), Some("ok"));

    let video: VideoResult = parse_result(json!({ "video_url": "v.mp4" })).unwrap();
    assert_eq!(video.message, None);

    let music: MusicResult = parse_result(json!({ "audio_url": "a.mp3" })).unwrap();
    assert_eq!(music.audio_url, "a.mp3");

    let recharge: RechargeResult = parse_result(json!({})).unwrap();
    assert_eq!(recharge.message, None);
}

#[test]
fn missing_url_is_invalid_result() {
    let err = parse_result::<ImageResult>(json!({ "message": "done" })).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidResult(_)));
}
