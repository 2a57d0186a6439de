//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Every error renders as a JSON body
//! of the form `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::status_file::StatusFileError;

/// Application-level error type for the bridge.
#[derive(Debug, Error)]
pub enum AppError {
    /// Status file could not be written.
    #[error("Status file error: {0}")]
    StatusFile(#[from] StatusFileError),

    /// Request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::StatusFile(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::StatusFile(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose file paths or I/O details to clients
        let message = match &self {
            Self::StatusFile(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Self::BadRequest("Invalid JSON".to_string())
        } else {
            Self::BadRequest(err.to_string())
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_shows_message() {
        let (status, body) = body_json(AppError::BadRequest("missing field `id`".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing field `id`");
    }

    #[tokio::test]
    async fn test_internal_error_is_redacted() {
        let err = AppError::StatusFile(StatusFileError::Io {
            path: "/srv/secret/status.json".into(),
            source: std::io::Error::other("disk full"),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_json_error_maps_to_bad_request() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid JSON"));

        let err: AppError = serde_json::from_str::<Vec<u8>>(r#""text""#)
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.starts_with("invalid type")));
    }
}
