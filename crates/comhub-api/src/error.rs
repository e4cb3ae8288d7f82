//! Maps domain `AppError` to HTTP responses.
//!
//! Every failure leaves the API as
//! `{"error": {"code": ..., "message": ..., "details": ...}}` with the HTTP
//! status mirroring the error kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use comhub_core::error::{AppError, ErrorKind};

/// Body of the error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details, e.g. the field map of a validation failure.
    pub details: Option<serde_json::Value>,
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ErrorBody,
}

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(AppError::from(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match err.kind {
            ErrorKind::Internal => {
                tracing::error!(code = err.code, error = %err.message, source = ?err.source, "Internal server error");
            }
            ErrorKind::Unavailable => {
                tracing::warn!(code = err.code, error = %err.message, "Backing service unavailable");
            }
            _ => {}
        }

        let details = if err.kind.is_client_visible() {
            err.details.clone()
        } else {
            None
        };

        let body = ApiErrorResponse {
            error: ErrorBody {
                code: err.code.to_string(),
                message: err.public_message(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let (status, body) =
            render(AppError::conflict("Resource is busy").with_code("RESOURCE_BUSY")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "RESOURCE_BUSY");
        assert_eq!(body["error"]["message"], "Resource is busy");
        assert!(body["error"]["details"].is_null());
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let (status, body) = render(
            AppError::internal("relation \"users\" does not exist")
                .with_details(serde_json::json!({"sql": "SELECT"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(body["error"]["details"].is_null());
    }

    #[tokio::test]
    async fn test_validation_details_are_kept() {
        let (status, body) = render(AppError::invalid_field("email", "must be valid")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(body["error"]["details"]["email"][0], "must be valid");
    }

    #[tokio::test]
    async fn test_unavailable_maps_to_503() {
        let (status, _) = render(AppError::unavailable("redis down")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
