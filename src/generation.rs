//! Request and response bodies for the paid generation endpoints.
//!
//! Every request carries its defaults explicitly; nothing is left for the
//! server to fill in. Validation runs before the session check so a blank
//! prompt is reported the same way whether or not the user is signed in.

#[cfg(test)]
#[path = "generation_test.rs"]
mod generation_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;

pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_VIDEO_SIZE: &str = "1024x1024";
pub const DEFAULT_VIDEO_DURATION: u32 = 5;
pub const VEO_SIZE: &str = "1920x1080";
pub const VEO_DURATION: u32 = 10;
pub const DEFAULT_MUSIC_DURATION: u32 = 30;
pub const DEFAULT_AVATAR_PROMPT: &str = "avatar";

/// Prefix every canvas `init_image` must carry.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A JSON body for one generation endpoint.
pub trait GenerationRequest: Serialize {
    /// Endpoint path below the API root.
    const PATH: &'static str;

    /// Reject the request locally, before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Validation`] naming the missing input.
    fn validate(&self) -> Result<(), GenerationError>;

    /// Validate, then serialize.
    ///
    /// # Errors
    ///
    /// Returns the validation failure, or `Validation` if serialization fails.
    fn to_body(&self) -> Result<Value, GenerationError> {
        self.validate()?;
        serde_json::to_value(self).map_err(|e| GenerationError::Validation(format!("unserializable request: {e}")))
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
}

impl ImageRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), size: DEFAULT_IMAGE_SIZE.to_owned() }
    }
}

impl GenerationRequest for ImageRequest {
    const PATH: &'static str = "/generate-image";

    fn validate(&self) -> Result<(), GenerationError> {
        require("prompt", &self.prompt)?;
        require("size", &self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub size: String,
    pub duration: u32,
}

impl VideoRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), size: DEFAULT_VIDEO_SIZE.to_owned(), duration: DEFAULT_VIDEO_DURATION }
    }

    /// The Veo preset: same endpoint, widescreen and longer.
    #[must_use]
    pub fn veo(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), size: VEO_SIZE.to_owned(), duration: VEO_DURATION }
    }
}

impl GenerationRequest for VideoRequest {
    const PATH: &'static str = "/generate-video";

    fn validate(&self) -> Result<(), GenerationError> {
        require("prompt", &self.prompt)?;
        require("size", &self.size)?;
        if self.duration == 0 {
            return Err(GenerationError::Validation("duration must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicRequest {
    pub prompt: String,
    pub duration: u32,
}

impl MusicRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), duration: DEFAULT_MUSIC_DURATION }
    }
}

impl GenerationRequest for MusicRequest {
    const PATH: &'static str = "/generate-music";

    fn validate(&self) -> Result<(), GenerationError> {
        require("prompt", &self.prompt)?;
        if self.duration == 0 {
            return Err(GenerationError::Validation("duration must be positive".into()));
        }
        Ok(())
    }
}

/// Talking avatar. `text` is the script; `prompt` describes the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarRequest {
    pub prompt: String,
    pub text: String,
}

impl AvatarRequest {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { prompt: DEFAULT_AVATAR_PROMPT.to_owned(), text: text.into() }
    }
}

impl GenerationRequest for AvatarRequest {
    const PATH: &'static str = "/generate-avatar";

    fn validate(&self) -> Result<(), GenerationError> {
        require("text", &self.text)?;
        require("prompt", &self.prompt)
    }
}

/// Image-to-image over the captured frame region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasRequest {
    pub prompt: String,
    /// PNG data URL of the captured region.
    pub init_image: String,
}

impl CanvasRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, init_image: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), init_image: init_image.into() }
    }
}

impl GenerationRequest for CanvasRequest {
    const PATH: &'static str = "/generate-canvas";

    fn validate(&self) -> Result<(), GenerationError> {
        require("prompt", &self.prompt)?;
        match self.init_image.strip_prefix(PNG_DATA_URL_PREFIX) {
            Some(payload) if !payload.is_empty() => Ok(()),
            _ => Err(GenerationError::Validation("init_image must be a PNG data URL".into())),
        }
    }
}

/// Balance top-up. Not a generation, but it shares the authenticated path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RechargeRequest {
    pub amount: f64,
}

impl RechargeRequest {
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }
}

impl GenerationRequest for RechargeRequest {
    const PATH: &'static str = "/payment/recharge";

    fn validate(&self) -> Result<(), GenerationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(GenerationError::Validation("amount must be a positive number".into()));
        }
        Ok(())
    }
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageResult {
    pub image_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Also returned by the avatar endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoResult {
    pub video_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MusicResult {
    pub audio_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RechargeResult {
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode a success body.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidResult`] if the body is missing fields.
pub fn parse_result<T: DeserializeOwned>(body: Value) -> Result<T, GenerationError> {
    serde_json::from_value(body).map_err(|e| GenerationError::InvalidResult(e.to_string()))
}
