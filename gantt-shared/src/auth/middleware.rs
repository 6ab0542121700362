/// Authentication middleware for Axum
///
/// Extracts `Authorization: Bearer <token>`, validates it with
/// [`super::jwt::validate_token`] and stores an [`AuthContext`] in the request
/// extensions. Anonymous requests pass through untouched, but a presented
/// token must be valid; routes that need a caller check for the extension.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, http::StatusCode, middleware::Next, response::{IntoResponse, Response}};
/// use gantt_shared::auth::middleware::optional_jwt_auth_middleware;
///
/// async fn layer(req: Request, next: Next) -> Response {
///     let secret = "a-secret-key-that-is-at-least-32-bytes".to_string();
///     match optional_jwt_auth_middleware(secret, req, next).await {
///         Ok(response) => response,
///         Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
///     }
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::jwt::{validate_token, Claims, JwtError};

/// Authenticated caller, added to request extensions
///
/// ```
/// use axum::Extension;
/// use gantt_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i32,

    pub username: String,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// A presented credential that cannot be accepted
#[derive(Debug, Error)]
pub enum AuthError {
    /// Authorization header is not a Bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

/// Reads the bearer token, if any
///
/// A header that is present but not `Bearer <token>` is an error rather than
/// an anonymous request.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid text".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the request's bearer token, if one was presented
pub fn authenticate_headers(
    headers: &HeaderMap,
    secret: &str,
) -> Result<Option<AuthContext>, AuthError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(None);
    };

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(Some(AuthContext::from_claims(claims)))
}

/// Attaches an [`AuthContext`] when a valid token is presented
pub async fn optional_jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Some(auth_context) = authenticate_headers(req.headers(), &secret)? {
        tracing::debug!(user_id = auth_context.user_id, "Request authenticated");
        req.extensions_mut().insert(auth_context);
    }
    Ok(next.run(req).await)
}
