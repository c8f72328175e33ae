//! Studio configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SURFACE_WIDTH: f64 = 1280.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 800.0;

const CREDENTIAL_FILE: &str = "credentials.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// API root without a trailing slash, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    pub timeouts: Timeouts,
    pub credential_path: PathBuf,
    pub surface_width: f64,
    pub surface_height: f64,
}

impl StudioConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `ATELIER_BASE_URL`: default `http://127.0.0.1:8000/api`
    /// - `ATELIER_REQUEST_TIMEOUT_SECS`: default 120
    /// - `ATELIER_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ATELIER_CREDENTIAL_PATH`: default `<data dir>/atelier/credentials.json`
    /// - `ATELIER_SURFACE_WIDTH` / `ATELIER_SURFACE_HEIGHT`: default 1280 x 800
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL does not parse
    /// as an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StudioConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`StudioConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(lookup("ATELIER_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("ATELIER_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("ATELIER_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let credential_path = lookup("ATELIER_CREDENTIAL_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(default_credential_path, PathBuf::from);

        Ok(Self {
            base_url,
            timeouts,
            credential_path,
            surface_width: parse_dimension(lookup("ATELIER_SURFACE_WIDTH"), DEFAULT_SURFACE_WIDTH),
            surface_height: parse_dimension(lookup("ATELIER_SURFACE_HEIGHT"), DEFAULT_SURFACE_HEIGHT),
        })
    }

    /// Replace the base URL (e.g. from a command line flag).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `url` is malformed.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(url)?;
        Ok(self)
    }
}

/// Trim whitespace and trailing slashes, then require an http(s) URL with a host.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] describing what is wrong.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason };

    let parsed = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(trimmed.to_owned())
}

fn default_credential_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("atelier"))
        .unwrap_or_else(|| PathBuf::from(".atelier"))
        .join(CREDENTIAL_FILE)
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_dimension(raw: Option<String>, default: f64) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 1.0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
