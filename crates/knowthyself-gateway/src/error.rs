use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use knowthyself_core::error::{GatewayError, GatewayErrorKind};
use serde_json::json;
use tracing::warn;

/// Handler error carrying the HTTP status it maps to.
///
/// Responses render as `{"error": "<message>"}` with the mapped status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Relays an upstream failure status and message unchanged.
    pub fn passthrough(status: u16, message: impl Into<String>) -> Self {
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match err.kind {
            GatewayErrorKind::NoAssistantAvailable => StatusCode::NOT_FOUND,
            GatewayErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            GatewayErrorKind::UnsupportedMedia => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayErrorKind::ThreadResolution
            | GatewayErrorKind::UpstreamStream
            | GatewayErrorKind::HttpStatus
            | GatewayErrorKind::Network
            | GatewayErrorKind::Parse
            | GatewayErrorKind::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
