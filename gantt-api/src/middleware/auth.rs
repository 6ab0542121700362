/// Authentication layers
///
/// [`authenticate`] wraps the whole router: it attaches an [`AuthContext`]
/// when a valid bearer token is presented and rejects invalid tokens with
/// 401. Anonymous requests continue, so task routes can fall back to the
/// identity named in the request when open mode is on.
///
/// [`require_auth`] is a route layer for endpoints that always need a caller
/// (profile, admin listing).

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use gantt_shared::auth::middleware::{optional_jwt_auth_middleware, AuthContext};

/// Attaches an `AuthContext` for valid bearer tokens
pub async fn authenticate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    optional_jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(ApiError::from)
}

/// Rejects requests that were not authenticated
pub async fn require_auth(req: Request, next: Next) -> Result<Response, ApiError> {
    if req.extensions().get::<AuthContext>().is_none() {
        return Err(ApiError::Unauthorized("Authentication required".to_string()));
    }
    Ok(next.run(req).await)
}
