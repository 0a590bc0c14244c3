//! Error taxonomy for the catalog API
//!
//! Every failure a request can hit is translated to an HTTP status and a
//! structured `{"error": ...}` body here, at the request boundary. Internal
//! detail is logged, never echoed to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the catalog API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid, or expired session credential on a protected route
    #[error("Unauthorized")]
    Unauthorized,

    /// Failed verification of a third-party identity assertion
    #[error("invalid identity token")]
    Authentication,

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Referenced product does not exist
    #[error("product not found")]
    NotFound,

    /// Concurrent modification detected on update
    #[error("product was modified concurrently")]
    Conflict,

    /// External text-generation call failed
    #[error("description generation failed")]
    Generation,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Authentication => (
                StatusCode::BAD_REQUEST,
                "invalid identity token".to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "product not found".to_string()),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "product was modified concurrently".to_string(),
            ),
            ApiError::Generation => (
                StatusCode::BAD_GATEWAY,
                "description generation failed".to_string(),
            ),
            ApiError::Database(DatabaseError::Unavailable(e)) => {
                tracing::warn!("Storage unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage temporarily unavailable".to_string(),
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
