/// User endpoints
///
/// # Endpoints
///
/// ```text
/// GET /api/users           display names for the identity picker (public)
/// GET /api/users/all       every account, newest first (auth)
/// GET /api/users/:username who a handle or display name resolves to (public)
/// GET /api/users/profile   the caller's profile (auth)
/// PUT /api/users/profile   change the caller's full name and/or email (auth)
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, Extension, Json};
use gantt_shared::auth::middleware::AuthContext;
use gantt_shared::models::user::UserOrder;
use gantt_shared::wire::{
    ProfileEnvelope, ProfileUpdateRequest, UserIdentity, UserProfile, UserSummary,
};
use validator::Validate;

/// GET /api/users
///
/// Display names (handle when there is none), sorted.
pub async fn list_display_names(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let users = state.store.list_users(UserOrder::DisplayName).await?;
    Ok(Json(
        users.iter().map(|u| u.display_name().to_string()).collect(),
    ))
}

/// GET /api/users/all
pub async fn list_all_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = state.store.list_users(UserOrder::NewestFirst).await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/// GET /api/users/:username
///
/// Resolves exactly as the task routes do, so clients can learn the owner
/// name their tasks will carry.
pub async fn find_user(
    State(state): State<AppState>,
    ApiPath(identifier): ApiPath<String>,
) -> ApiResult<Json<UserIdentity>> {
    let user = state
        .store
        .find_user_by_handle_or_name(&identifier)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(UserIdentity::from(&user)))
}

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(UserProfile::from(&user)))
}

/// PUT /api/users/profile
///
/// 409 when the email belongs to another account, or when the full name is
/// already another account's handle or display name.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileEnvelope>> {
    if req.full_name.is_none() && req.email.is_none() {
        return Err(ApiError::BadRequest(
            "At least one field (fullName or email) is required".to_string(),
        ));
    }
    req.validate()?;

    let user = state
        .store
        .update_profile(auth.user_id, req.into_changes())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(ProfileEnvelope {
        message: "Profile updated successfully".to_string(),
        user: UserProfile::from(&user),
    }))
}
