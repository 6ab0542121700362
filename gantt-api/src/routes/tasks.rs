/// Task endpoints
///
/// # Endpoints
///
/// ```text
/// GET    /api/tasks                     all tasks, by start date then owner
/// POST   /api/tasks                     create for the caller (or body `owner` in open mode)
/// GET    /api/tasks/:username           one user's tasks, by start date
/// POST   /api/tasks/:username           create under a user
/// PUT    /api/tasks/:username/:taskId   partial update
/// DELETE /api/tasks/:username/:taskId   delete
/// PUT    /api/tasks/:taskId             legacy update, caller in body `currentUser`
/// DELETE /api/tasks/:taskId             legacy delete, caller in body `currentUser`
/// ```
///
/// `:username` accepts a handle or a display name.
///
/// # Caller identity
///
/// A valid bearer token always decides who is acting. Without one, the
/// caller named by the request (path user, `owner` or `currentUser`) is
/// trusted only when the server runs in open mode; otherwise the request is
/// rejected with 401.
///
/// # Ownership
///
/// Updates and deletes run through the store's owner-scoped operations:
/// an unknown task id is 404, someone else's task is 403.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use gantt_shared::auth::middleware::AuthContext;
use gantt_shared::models::user::User;
use gantt_shared::store::{Scoped, TaskScope};
use gantt_shared::wire::{DeleteEnvelope, TaskEnvelope, TaskPayload, TaskView};
use tracing::info;

const CREATED: &str = "Task created successfully";
const UPDATED: &str = "Task updated successfully";
const DELETED: &str = "Task deleted successfully";

type Auth = Option<Extension<AuthContext>>;

/// GET /api/tasks
pub async fn list_all_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = state.store.list_tasks(TaskScope::All).await?;
    Ok(Json(tasks.iter().map(TaskView::from).collect()))
}

/// GET /api/tasks/:username
pub async fn list_user_tasks(
    State(state): State<AppState>,
    ApiPath(identifier): ApiPath<String>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let user = resolve_user(&state, &identifier).await?;
    let tasks = state.store.list_tasks(TaskScope::Owner(user.id)).await?;
    Ok(Json(tasks.iter().map(TaskView::from).collect()))
}

/// POST /api/tasks/:username
pub async fn create_user_task(
    State(state): State<AppState>,
    auth: Auth,
    ApiPath(identifier): ApiPath<String>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let named = resolve_user(&state, &identifier).await?;
    let owner = creator(&state, auth_context(&auth), named)?;
    create_task(&state, owner, &payload).await
}

/// POST /api/tasks
pub async fn create_task_for_caller(
    State(state): State<AppState>,
    auth: Auth,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let owner = match auth_context(&auth) {
        Some(context) => {
            let caller = authenticated_user(&state, context).await?;
            if let Some(owner) = payload.owner.as_deref() {
                if !caller.is_identified_by(owner) {
                    return Err(ApiError::Forbidden(
                        "You can only create tasks for yourself".to_string(),
                    ));
                }
            }
            caller
        }
        None => {
            require_open_mode(&state)?;
            let owner = required_identity(payload.owner.as_deref(), "owner")?;
            resolve_user(&state, owner).await?
        }
    };
    create_task(&state, owner, &payload).await
}

/// PUT /api/tasks/:username/:taskId
pub async fn update_user_task(
    State(state): State<AppState>,
    auth: Auth,
    ApiPath((identifier, task_id)): ApiPath<(String, String)>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<Json<TaskEnvelope>> {
    let named = resolve_user(&state, &identifier).await?;
    let actor = acting_user(&state, auth_context(&auth), named).await?;
    update_task(&state, actor, &task_id, &payload).await
}

/// DELETE /api/tasks/:username/:taskId
pub async fn delete_user_task(
    State(state): State<AppState>,
    auth: Auth,
    ApiPath((identifier, task_id)): ApiPath<(String, String)>,
) -> ApiResult<Json<DeleteEnvelope>> {
    let named = resolve_user(&state, &identifier).await?;
    let actor = acting_user(&state, auth_context(&auth), named).await?;
    delete_task(&state, actor, &task_id).await
}

/// PUT /api/tasks/:taskId
pub async fn update_task_legacy(
    State(state): State<AppState>,
    auth: Auth,
    ApiPath(task_id): ApiPath<String>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<Json<TaskEnvelope>> {
    let actor = legacy_actor(&state, auth_context(&auth), payload.current_user.as_deref()).await?;

    if let Some(owner) = payload.owner.as_deref() {
        if !actor.is_identified_by(owner) {
            return Err(ApiError::BadRequest("Task owner cannot be changed".to_string()));
        }
    }
    update_task(&state, actor, &task_id, &payload).await
}

/// DELETE /api/tasks/:taskId
pub async fn delete_task_legacy(
    State(state): State<AppState>,
    auth: Auth,
    ApiPath(task_id): ApiPath<String>,
    body: Option<ApiJson<TaskPayload>>,
) -> ApiResult<Json<DeleteEnvelope>> {
    let current_user = body.as_ref().and_then(|ApiJson(p)| p.current_user.as_deref());
    let actor = legacy_actor(&state, auth_context(&auth), current_user).await?;
    delete_task(&state, actor, &task_id).await
}

async fn create_task(
    state: &AppState,
    owner: User,
    payload: &TaskPayload,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let new_task = payload.to_new_task()?;
    let task = state.store.insert_task(owner.id, new_task).await?;

    info!(task_id = task.id, owner_id = owner.id, "Task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskEnvelope {
            message: CREATED.to_string(),
            task: TaskView::from_task(&task, owner.display_name()),
        }),
    ))
}

async fn update_task(
    state: &AppState,
    actor: User,
    task_id: &str,
    payload: &TaskPayload,
) -> ApiResult<Json<TaskEnvelope>> {
    let task_id = parse_task_id(task_id)?;
    let changes = payload.to_changes()?;

    match state.store.update_task(actor.id, task_id, changes).await? {
        Scoped::Done(task) => {
            info!(task_id, user_id = actor.id, "Task updated");
            Ok(Json(TaskEnvelope {
                message: UPDATED.to_string(),
                task: TaskView::from_task(&task, actor.display_name()),
            }))
        }
        Scoped::Missing => Err(task_not_found()),
        Scoped::NotOwner { owner_id } => {
            info!(task_id, user_id = actor.id, owner_id, "Update of another user's task refused");
            Err(ApiError::Forbidden("You can only update your own tasks".to_string()))
        }
    }
}

async fn delete_task(
    state: &AppState,
    actor: User,
    task_id: &str,
) -> ApiResult<Json<DeleteEnvelope>> {
    let task_id = parse_task_id(task_id)?;

    match state.store.delete_task(actor.id, task_id).await? {
        Scoped::Done(deleted) => {
            info!(task_id, user_id = actor.id, "Task deleted");
            Ok(Json(DeleteEnvelope {
                message: DELETED.to_string(),
                deleted_task: deleted,
            }))
        }
        Scoped::Missing => Err(task_not_found()),
        Scoped::NotOwner { owner_id } => {
            info!(task_id, user_id = actor.id, owner_id, "Delete of another user's task refused");
            Err(ApiError::Forbidden("You can only delete your own tasks".to_string()))
        }
    }
}

fn auth_context(auth: &Auth) -> Option<&AuthContext> {
    auth.as_ref().map(|Extension(context)| context)
}

/// Who creates a task under `named`: the caller, who must be `named`
fn creator(state: &AppState, auth: Option<&AuthContext>, named: User) -> ApiResult<User> {
    match auth {
        Some(context) if context.user_id != named.id => Err(ApiError::Forbidden(
            "You can only create tasks for yourself".to_string(),
        )),
        Some(_) => Ok(named),
        None => {
            require_open_mode(state)?;
            Ok(named)
        }
    }
}

/// Who acts on a task addressed under `named`
async fn acting_user(state: &AppState, auth: Option<&AuthContext>, named: User) -> ApiResult<User> {
    match auth {
        Some(context) if context.user_id == named.id => Ok(named),
        Some(context) => authenticated_user(state, context).await,
        None => {
            require_open_mode(state)?;
            Ok(named)
        }
    }
}

/// Who acts on a legacy flat route, where the caller is named in the body
async fn legacy_actor(
    state: &AppState,
    auth: Option<&AuthContext>,
    current_user: Option<&str>,
) -> ApiResult<User> {
    match auth {
        Some(context) => authenticated_user(state, context).await,
        None => {
            require_open_mode(state)?;
            let identifier = required_identity(current_user, "currentUser")?;
            resolve_user(state, identifier).await
        }
    }
}

async fn resolve_user(state: &AppState, identifier: &str) -> ApiResult<User> {
    state
        .store
        .find_user_by_handle_or_name(identifier)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

async fn authenticated_user(state: &AppState, context: &AuthContext) -> ApiResult<User> {
    state
        .store
        .find_user_by_id(context.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))
}

fn require_open_mode(state: &AppState) -> ApiResult<()> {
    if state.config.api.open_mode {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("Authentication required".to_string()))
    }
}

fn required_identity<'a>(value: Option<&'a str>, field: &str) -> ApiResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

fn parse_task_id(raw: &str) -> ApiResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid task id: {}", raw)))
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("42").unwrap(), 42);
        assert!(matches!(parse_task_id("abc"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_task_id(""), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_required_identity() {
        assert_eq!(required_identity(Some(" alice "), "owner").unwrap(), "alice");
        assert!(required_identity(Some("  "), "owner").is_err());
        assert!(required_identity(None, "currentUser").is_err());
    }
}
