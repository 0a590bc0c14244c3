//! Authentication middleware for session credential validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Authenticated caller identity extracted from a verified credential.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
}

/// Extract and validate the bearer session credential.
///
/// Every failure collapses to the same unauthenticated response; the cause
/// is logged, never surfaced to the caller.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt_service.verify(token).map_err(|e| {
        warn!("Failed to validate session credential: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser {
        subject: claims.sub,
    });

    Ok(next.run(req).await)
}
