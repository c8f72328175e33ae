//! Errors raised while rasterizing the scene or exporting a region.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Grepable error code and retryable flag for user-visible errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by a [`crate::render::Rasterizer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The requested surface has a zero or oversized dimension.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    /// The rasterizer backend failed for another reason.
    #[error("rasterization failed: {0}")]
    Backend(String),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSurface { .. } => "E_INVALID_SURFACE",
            Self::Backend(_) => "E_RENDER_BACKEND",
        }
    }
}

/// Errors produced while capturing a region of the scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Rendering the composed scene failed.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// The frame does not overlap the visible surface.
    #[error("capture region lies outside the visible surface")]
    EmptyRegion,

    /// The captured pixels could not be encoded as PNG.
    #[error("png encode failed: {0}")]
    Encode(String),
}

impl ErrorCode for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Render(_) => "E_CAPTURE_RENDER",
            Self::EmptyRegion => "E_CAPTURE_EMPTY_REGION",
            Self::Encode(_) => "E_CAPTURE_ENCODE",
        }
    }
}
