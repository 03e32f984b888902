//! HTTP error mapping
//!
//! Every failure leaves the service as `{ "error": CODE, "message": text }`,
//! except the rate limiter's 429.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `NOT_FOUND`
    #[schema(example = "NOT_FOUND")]
    pub error: String,
    /// Human-readable description
    #[schema(example = "User with id 42 not found")]
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    UnsupportedMediaType(String),
    NotFound(String),
    Conflict(String),
    /// Logged server-side, never shown to the client.
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Database(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed with internal error");
                "Something went wrong".to_string()
            }
            Self::Validation(msg)
            | Self::UnsupportedMediaType(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg,
        };

        let body = ErrorResponse {
            error: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponse) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_mapping() {
        let (status, body) = body_of(DomainError::user_not_found("x1").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "NOT_FOUND");
        assert_eq!(body.message, "User with id x1 not found");
    }

    #[tokio::test]
    async fn test_conflict_mapping() {
        let (status, body) = body_of(DomainError::email_taken("a@b.io").into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "CONFLICT");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err = DomainError::Database("connection refused at 10.0.0.3".into());
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "INTERNAL_SERVER_ERROR");
        assert_eq!(body.message, "Something went wrong");
    }
}
