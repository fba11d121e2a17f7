//! Core Error Types
//!
//! Defines the foundational error types used across the Mentor workspace.
//! These error types are dependency-free (only thiserror + std) to keep the core
//! crate lightweight.
//!
//! `DispatchError` is the failure type of a single operation handler. The
//! dispatcher converts every variant into a user-facing string, so these never
//! escape to the caller of the dispatch pipeline.

use thiserror::Error;

/// Core error type for the Mentor workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Failure of a single dispatched operation.
///
/// The remote-API categories (`Unauthorized`, `Forbidden`, `RateLimited`) are
/// kept apart because each one maps to different user guidance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// HTTP 401 from the remote API
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 403 from the remote API
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// HTTP 429 from the remote API
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// HTTP 404 or an empty lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required parameter was absent from the request
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Connection, timeout or other transport failure
    #[error("Network error: {0}")]
    Transport(String),

    /// The remote response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Any other non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type alias for operation handlers
pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    /// Create a missing-parameter error
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter(name.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Map an HTTP status and body to the matching category.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = body.trim().to_string();
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimited(message),
            _ => Self::Api { status, message },
        }
    }

    /// Short user-facing label for the category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "authorization error",
            Self::Forbidden(_) => "access denied",
            Self::RateLimited(_) => "rate limit exceeded",
            Self::NotFound(_) => "not found",
            Self::MissingParameter(_) => "missing parameter",
            Self::Transport(_) => "network error",
            Self::Decode(_) => "unexpected response",
            Self::Api { .. } => "API error",
        }
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
