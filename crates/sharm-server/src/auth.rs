use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use sharm_core::{AppError, Requester};

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that verifies `Authorization: Bearer <token>` and stores the
/// decoded [`Requester`] as a request extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        AppError::Unauthorized(
            "Missing or invalid Authorization header. Expected: Bearer <token>".into(),
        )
    })?;

    let claims = state.keys.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    request.extensions_mut().insert(Requester::from(claims));
    Ok(next.run(request).await)
}

/// Middleware for admin-only routes. Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let requester = request
        .extensions()
        .get::<Requester>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    if !requester.is_admin() {
        tracing::info!(user_id = requester.id, "admin route refused");
        return Err(AppError::Forbidden("Admin role required".into()).into());
    }

    Ok(next.run(request).await)
}
