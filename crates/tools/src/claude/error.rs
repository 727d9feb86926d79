//! Messages API failures.

use serde::Deserialize;
use thiserror::Error;

/// Failure of a single completion request.
#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error object returned by the API.
    #[error("API error ({kind}): {message}")]
    Api { kind: String, message: String },

    /// HTTP 429; the value comes from `Retry-After`.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// HTTP 529.
    #[error("the API is overloaded, try again later")]
    Overloaded,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClaudeError {
    /// Build a [`ClaudeError::Api`] from an error response body, keeping the
    /// raw body when it is not an API error object.
    #[must_use]
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Self::Api {
                kind: envelope.error.kind,
                message: envelope.error.message,
            },
            Err(_) => Self::Api {
                kind: "unknown".to_string(),
                message: body,
            },
        }
    }
}

/// `{"type": "error", "error": {"type": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}
