//! API error type and the user-facing error taxonomy.

use reqwest::StatusCode;
use serde_json::Value;
use starc_core::CoreError;
use thiserror::Error;

/// How a failure should surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing, invalid, or expired credential; send the user to login.
    Authentication,
    /// Document missing or access denied; show an inline message.
    NotFound,
    /// Network or server failure; log and keep prior state.
    Transient,
    /// Rejected input; show a field-level or form-level message.
    Validation,
}

/// Errors returned by [`crate::ApiClient`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session error: {0}")]
    Session(#[from] CoreError),
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized(_) => ErrorClass::Authentication,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::BadRequest(_) | Self::InvalidUrl(_) => ErrorClass::Validation,
            Self::Server { .. }
            | Self::Transport(_)
            | Self::Decode(_)
            | Self::Io(_)
            | Self::Session(_) => ErrorClass::Transient,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.class() == ErrorClass::Authentication
    }

    /// Message suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Map a non-success status and its body onto an error variant.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message_for_response(status, body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::BadRequest(message)
            }
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

/// Extract a human-readable message from an error response body.
///
/// Prefers a JSON `message` field, then `error`, then the raw body; an empty
/// body yields the status reason phrase.
pub fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return ["message", "error", "msg"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}
