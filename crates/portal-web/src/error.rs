//! Error types for the portal HTTP interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal::PortalError;
use thiserror::Error;

/// Errors returned by portal handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Portal operation failed.
    #[error(transparent)]
    Portal(#[from] PortalError),

    /// Request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Portal(err) => match err {
                PortalError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
                PortalError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                PortalError::ValidationFailed(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                PortalError::AlreadyActive => (StatusCode::CONFLICT, err.to_string()),
                PortalError::Backend(backend) => {
                    tracing::error!("Backend error: {}", backend);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Something went wrong. Please try again.".to_string(),
                    )
                }
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
