//! Uniform tool result envelope
//!
//! Every tool call ends in a [`ToolEnvelope`]. Validation and backend
//! failures are values here, never protocol errors.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::json;

use crate::backend::BackendError;

/// Category of a failed tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// A caller-supplied parameter failed validation; the backend was not called
    InvalidArgument,
    Timeout,
    BackendUnreachable,
    /// The backend answered with a failure status
    BackendError,
    /// The requested repository or path does not exist
    NotFound,
    /// The backend answered with a body that could not be decoded
    InvalidResponse,
}

/// Error payload of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    pub kind: ToolErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ToolFailure {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArgument, message)
    }
}

impl From<BackendError> for ToolFailure {
    fn from(err: BackendError) -> Self {
        let message = err.to_string();
        match err {
            BackendError::Timeout(_) => Self::new(ToolErrorKind::Timeout, message),
            BackendError::Unreachable(_) => Self::new(ToolErrorKind::BackendUnreachable, message),
            BackendError::Status { status, body } => Self {
                kind: ToolErrorKind::BackendError,
                message: format!("Backend returned HTTP {}", status),
                status: Some(status),
                body: Some(body),
            },
            BackendError::NotFound(_) => Self::new(ToolErrorKind::NotFound, message),
            BackendError::Decode(_) => Self::new(ToolErrorKind::InvalidResponse, message),
        }
    }
}

/// Result of a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolEnvelope {
    Success { text: String, truncated: bool },
    Failure(ToolFailure),
}

impl ToolEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success {
            text: text.into(),
            truncated: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the success payload was cut to fit a size limit
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Success { truncated: true, .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text, .. } => Some(text),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Success { .. } => None,
        }
    }

    /// Convert into the MCP result; failures set `is_error` and carry JSON
    ///
    /// The `truncated` flag travels in `structured_content` next to the text.
    pub fn into_call_tool_result(self) -> CallToolResult {
        match self {
            Self::Success { text, truncated } => {
                let structured = json!({ "truncated": truncated });
                let mut result = CallToolResult::success(vec![Content::text(text)]);
                result.structured_content = Some(structured);
                result
            }
            Self::Failure(failure) => {
                let structured = serde_json::to_value(&failure).ok();
                let json = serde_json::to_string_pretty(&failure)
                    .unwrap_or_else(|_| failure.message.clone());
                let mut result = CallToolResult::error(vec![Content::text(json)]);
                result.structured_content = structured;
                result
            }
        }
    }
}

impl From<ToolFailure> for ToolEnvelope {
    fn from(failure: ToolFailure) -> Self {
        Self::Failure(failure)
    }
}

impl From<BackendError> for ToolEnvelope {
    fn from(err: BackendError) -> Self {
        Self::Failure(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_preserves_status_and_body() {
        let failure = ToolFailure::from(BackendError::status(503, "zoekt overloaded"));
        assert_eq!(failure.kind, ToolErrorKind::BackendError);
        assert_eq!(failure.status, Some(503));
        assert_eq!(failure.body.as_deref(), Some("zoekt overloaded"));
    }

    #[test]
    fn test_error_kind_mapping() {
        let cases = [
            (BackendError::timeout("t"), ToolErrorKind::Timeout),
            (BackendError::unreachable("u"), ToolErrorKind::BackendUnreachable),
            (BackendError::not_found("n"), ToolErrorKind::NotFound),
            (BackendError::decode("d"), ToolErrorKind::InvalidResponse),
        ];
        for (err, kind) in cases {
            assert_eq!(ToolFailure::from(err).kind, kind);
        }
    }

    #[test]
    fn test_failure_json_shape() {
        let failure = ToolFailure::from(BackendError::status(503, "busy"));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "backend_error");
        assert_eq!(json["status"], 503);
        assert_eq!(json["body"], "busy");

        let json = serde_json::to_value(ToolFailure::invalid_argument("bad")).unwrap();
        assert_eq!(json["kind"], "invalid_argument");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_into_call_tool_result() {
        let result = ToolEnvelope::success("ok").into_call_tool_result();
        assert_eq!(result.is_error, Some(false));

        let result = ToolEnvelope::from(ToolFailure::invalid_argument("bad")).into_call_tool_result();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.structured_content.unwrap()["kind"], "invalid_argument");
    }

    #[test]
    fn test_truncated_flag_reaches_call_tool_result() {
        let result = ToolEnvelope::Success {
            text: "partial".to_string(),
            truncated: true,
        }
        .into_call_tool_result();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content.unwrap()["truncated"], true);

        let result = ToolEnvelope::success("complete").into_call_tool_result();
        assert_eq!(result.structured_content.unwrap()["truncated"], false);
    }
}
