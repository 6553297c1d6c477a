//! Translation from domain errors to HTTP outcomes.
//!
//! Authentication failures all collapse into one 401 body plus the bearer
//! challenge; throttle denials are a distinct 429; internal detail never
//! reaches the caller.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use domains::DomainError;

/// Seconds a throttled caller is told to wait before retrying.
const RETRY_AFTER_SECS: &str = "60";

pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            DomainError::NotFound(resource, id) => {
                tracing::debug!(%resource, %id, "resource not found");
                payload(StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            DomainError::Validation(detail) => payload(StatusCode::BAD_REQUEST, detail),
            DomainError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            DomainError::RateLimited(detail) => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            DomainError::Conflict(detail) => payload(StatusCode::CONFLICT, detail),
            DomainError::Integrity(detail) => {
                error!(%detail, "data integrity fault");
                payload(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            DomainError::Internal(detail) => {
                error!(%detail, "internal fault");
                payload(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

fn payload(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}
