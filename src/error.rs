//! Errors for the orchestration layer.
//!
//! Every enum implements [`ErrorCode`] from the canvas crate so the host can
//! log a stable code next to the message. Nothing in this crate retries, so
//! `retryable()` keeps its `false` default throughout.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

pub use canvas::error::{CaptureError, ErrorCode, RenderError};

// =============================================================================
// CONFIG
// =============================================================================

/// A configuration value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { .. } => "E_CONFIG_BASE_URL",
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// The HTTP layer failed before a usable response arrived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// Connection, timeout, or body read failure.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// A request or asset URL could not be resolved against the base URL.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// An asset download returned a non-success status.
    #[error("download failed with status {0}")]
    Status(u16),
}

impl ErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_HTTP_REQUEST",
            Self::InvalidUrl(_) => "E_HTTP_URL",
            Self::Status(_) => "E_HTTP_STATUS",
        }
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Reading or writing the persisted credential failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("credential store I/O failed: {0}")]
    Io(String),

    #[error("credential file is malformed: {0}")]
    Malformed(String),
}

impl ErrorCode for CredentialError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_CREDENTIAL_IO",
            Self::Malformed(_) => "E_CREDENTIAL_MALFORMED",
        }
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Outcome of a failed user action. Every variant is terminal for that action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Required input was blank or out of range. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// No session, or the server rejected the credential. Log in again.
    #[error("not logged in")]
    Unauthenticated,

    /// The server refused the spend. Top up and try again.
    #[error("insufficient balance: {0}")]
    InsufficientFunds(String),

    /// Any other non-success response or network failure.
    #[error("{0}")]
    RequestFailed(String),

    /// The canvas region could not be exported.
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The generated asset could not be downloaded or decoded.
    #[error("result could not be loaded: {0}")]
    InvalidResult(String),

    /// The credential could not be persisted or cleared.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ErrorCode for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::InsufficientFunds(_) => "E_INSUFFICIENT_FUNDS",
            Self::RequestFailed(_) => "E_REQUEST_FAILED",
            Self::Capture(e) => e.error_code(),
            Self::InvalidResult(_) => "E_INVALID_RESULT",
            Self::Credential(e) => e.error_code(),
        }
    }
}

impl From<TransportError> for GenerationError {
    fn from(e: TransportError) -> Self {
        Self::RequestFailed(e.to_string())
    }
}
