//! HTTP transport seam and backend wire types.
//!
//! DESIGN
//! ======
//! Everything above this module talks to the backend through [`Transport`],
//! so the session/pipeline logic is tested against a counting mock and the
//! reqwest client only lives in [`HttpTransport`]. Responses are handed up as
//! status + JSON; interpreting status codes is the pipeline's job.

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Timeouts;
use crate::error::TransportError;

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
}

/// A backend call, relative to the configured API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API root, starting with `/`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), bearer: None, body: RequestBody::Empty }
    }

    #[must_use]
    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Post, path: path.into(), bearer: None, body: RequestBody::Json(body) }
    }

    #[must_use]
    pub fn post_form(path: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Self { method: Method::Post, path: path.into(), bearer: None, body: RequestBody::Form(fields) }
    }

    /// Attach an `Authorization: Bearer` credential.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status and decoded body of a completed HTTP exchange.
///
/// Empty bodies decode as `Null`; non-JSON bodies are kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into a typed response.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not match `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }

    /// Human-readable failure detail from an error body, if any.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match &self.body {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(_) => ErrorBody::deserialize(&self.body)
                .ok()
                .and_then(|b| b.message()),
            _ => None,
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends backend requests. One call per invocation; no retries or queueing.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform `request` and return whatever status the server answered with.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Download a generated asset. Relative URLs resolve against the API root.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the TLS backend fails to initialise.
    pub fn new(base_url: impl Into<String>, timeouts: Timeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        };

        tracing::debug!(method = ?request.method, path = %request.path, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        tracing::debug!(status, path = %request.path, "response received");

        Ok(ApiResponse { status, body: decode_body(&text) })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let resolved = resolve_url(&self.base_url, url)?;
        let response = self
            .http
            .get(resolved)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Parse a response body, keeping non-JSON text as a string value.
#[must_use]
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Resolve an asset URL returned by the backend.
///
/// Absolute URLs pass through; `/static/x.png` resolves against the API
/// root's origin and `x.png` against the API root itself.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] if neither the base nor the joined URL parses.
pub fn resolve_url(base_url: &str, url: &str) -> Result<reqwest::Url, TransportError> {
    if let Ok(absolute) = reqwest::Url::parse(url) {
        return Ok(absolute);
    }
    let base = reqwest::Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
        .map_err(|_| TransportError::InvalidUrl(base_url.to_owned()))?;
    base.join(url)
        .map_err(|_| TransportError::InvalidUrl(url.to_owned()))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// `GET /user/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub balance: f64,
}

/// `POST /auth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Failure body. `detail` is usually a string but validation failures carry a list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// `detail` as display text; structured details are rendered as JSON.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
