//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use store::StoreError;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AuthError::BadRequest(msg),
            err @ StoreError::NotFound { .. } => AuthError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            err @ StoreError::TransientIo(_) => AuthError::ServiceUnavailable(err.to_string()),
            StoreError::Internal(msg) => {
                error!("Store failure: {}", msg);
                AuthError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
