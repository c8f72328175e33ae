use super::*;

#[test]
fn render_error_codes() {
    assert_eq!(RenderError::InvalidSurface { width: 0, height: 1 }.error_code(), "E_INVALID_SURFACE");
    assert_eq!(RenderError::Backend("x".into()).error_code(), "E_RENDER_BACKEND");
}

#[test]
fn capture_error_wraps_render_error() {
    let err: CaptureError = RenderError::Backend("gpu lost".into()).into();
    assert_eq!(err.error_code(), "E_CAPTURE_RENDER");
    assert!(err.to_string().contains("gpu lost"));
}

#[test]
fn nothing_is_retryable() {
    assert!(!CaptureError::EmptyRegion.retryable());
    assert!(!RenderError::InvalidSurface { width: 0, height: 0 }.retryable());
}

#[test]
fn invalid_surface_message_includes_size() {
    let msg = RenderError::InvalidSurface { width: 0, height: 600 }.to_string();
    assert_eq!(msg, "invalid surface size 0x600");
}
