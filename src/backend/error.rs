//! Backend error types
//!
//! Every failure of an outbound call is normalized into one of these.

use thiserror::Error;

/// Longest response body kept for diagnostics
pub const MAX_ERROR_BODY_BYTES: usize = 4096;

/// Errors that can occur while talking to the search backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request did not complete within the configured timeout
    #[error("Backend request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure and similar
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The requested repository or path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded
    #[error("Invalid backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an unreachable error
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create a status error, capping the preserved body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_ERROR_BODY_BYTES {
            let mut cut = MAX_ERROR_BODY_BYTES;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::Status { status, body }
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_connect() {
            Self::unreachable(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::unreachable(err.to_string())
        }
    }
}
