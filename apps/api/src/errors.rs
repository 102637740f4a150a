use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::{ErrorClass, IngestError};
use crate::notify::NotifyError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ingest(e) => {
                let status = match (e, e.class()) {
                    (IngestError::FileTooLarge { .. }, _) => StatusCode::PAYLOAD_TOO_LARGE,
                    (_, ErrorClass::Input) => StatusCode::BAD_REQUEST,
                    (_, ErrorClass::Content) => StatusCode::UNPROCESSABLE_ENTITY,
                    (_, ErrorClass::Environment) => {
                        tracing::error!("Extraction environment error: {e}");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                };
                (status, e.code(), e.to_string())
            }
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg.clone()),
            AppError::Notify(e) => {
                tracing::error!("Notification error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOTIFY_ERROR",
                    "Failed to send notification. Please try again later.".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_errors_map_by_class() {
        let cases = [
            (IngestError::NoFileProvided, StatusCode::BAD_REQUEST),
            (
                IngestError::FileTooLarge { size: 2, max: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (IngestError::EncryptedDocument, StatusCode::UNPROCESSABLE_ENTITY),
            (IngestError::NoExtractableText, StatusCode::UNPROCESSABLE_ENTITY),
            (
                IngestError::WorkerUnavailable("gone".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let code = err.code();
            let (status, body_code, _) = AppError::from(err).parts();
            assert_eq!(status, expected);
            assert_eq!(body_code, code);
        }
    }

    #[test]
    fn test_rate_limited_is_429() {
        let (status, code, msg) = AppError::RateLimited("slow down".into()).parts();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(code, "RATE_LIMITED");
        assert_eq!(msg, "slow down");
    }
}
