//! Gateway-wide error taxonomy shared between the backend client, the relay,
//! and the chat session.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of gateway errors for consistent handling and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// The backend assistant registry is empty
    NoAssistantAvailable,
    /// Thread creation or fetch against the backend failed
    ThreadResolution,
    /// Failure while relaying an already-open upstream stream
    UpstreamStream,
    /// HTTP status error from an upstream service (4xx, 5xx)
    HttpStatus,
    /// Request-level network failure (connect, timeout, aborted body)
    Network,
    /// Failed to parse an upstream response (JSON, SSE framing)
    Parse,
    /// The caller's request is missing or has malformed parameters
    InvalidRequest,
    /// The requested file type is not allowed
    UnsupportedMedia,
    /// A required upstream base URL is not configured
    Unconfigured,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatewayErrorKind::NoAssistantAvailable => "no_assistant_available",
            GatewayErrorKind::ThreadResolution => "thread_resolution",
            GatewayErrorKind::UpstreamStream => "upstream_stream",
            GatewayErrorKind::HttpStatus => "http_status",
            GatewayErrorKind::Network => "network",
            GatewayErrorKind::Parse => "parse",
            GatewayErrorKind::InvalidRequest => "invalid_request",
            GatewayErrorKind::UnsupportedMedia => "unsupported_media",
            GatewayErrorKind::Unconfigured => "unconfigured",
        };
        write!(f, "{name}")
    }
}

/// Structured gateway error with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error category
    pub kind: GatewayErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl GatewayError {
    /// Creates a new gateway error.
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// The backend registry returned no assistants.
    pub fn no_assistant() -> Self {
        Self::new(
            GatewayErrorKind::NoAssistantAvailable,
            "No assistants found on the backend",
        )
    }

    /// Thread creation or lookup failed.
    pub fn thread_resolution(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ThreadResolution, message)
    }

    /// Creates an upstream streaming error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::UpstreamStream, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Parse, message)
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    /// Creates an HTTP status error from an upstream response body.
    ///
    /// Prefers a `detail` or `error.message` string when the body is JSON,
    /// falling back to the raw body text.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body) {
                let msg = json
                    .get("detail")
                    .and_then(|v| v.as_str())
                    .or_else(|| {
                        json.get("error")
                            .and_then(|e| e.get("message"))
                            .and_then(|v| v.as_str())
                    })
                    .or_else(|| json.get("error").and_then(|v| v.as_str()));
                if let Some(msg) = msg {
                    return Self {
                        kind: GatewayErrorKind::HttpStatus,
                        message: format!("HTTP {status}: {msg}"),
                        details: Some(body.to_string()),
                    };
                }
            }
            Some(body.to_string())
        };
        Self {
            kind: GatewayErrorKind::HttpStatus,
            message,
            details,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: `http_status` extracts a FastAPI-style `detail` string.
    #[test]
    fn test_http_status_extracts_detail() {
        let err = GatewayError::http_status(404, r#"{"detail":"file not found"}"#);
        assert_eq!(err.kind, GatewayErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: file not found");
        assert!(err.details.is_some());
    }

    /// Test: `http_status` falls back to the raw body for non-JSON responses.
    #[test]
    fn test_http_status_non_json_body() {
        let err = GatewayError::http_status(502, "bad gateway");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("bad gateway"));
    }

    /// Test: empty bodies leave details unset.
    #[test]
    fn test_http_status_empty_body() {
        let err = GatewayError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_none());
    }
}
