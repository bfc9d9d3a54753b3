//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use store::StoreError;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input or an unusable request
    #[error("{0}")]
    BadRequest(String),

    /// Missing or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate key, or a delete blocked by references
    #[error("{0}")]
    Conflict(String),

    /// Backing store unreachable or timed out
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            err @ StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            err @ StoreError::TransientIo(_) => {
                error!("Store unavailable: {}", err);
                ApiError::ServiceUnavailable(err.to_string())
            }
            StoreError::Internal(msg) => {
                error!("Store failure: {}", msg);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::Validation("bad id".to_string()), StatusCode::BAD_REQUEST),
            (StoreError::not_found("recipe", "id", "x"), StatusCode::NOT_FOUND),
            (StoreError::Conflict("taken".to_string()), StatusCode::CONFLICT),
            (
                StoreError::TransientIo("timed out".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::Internal("decode".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
