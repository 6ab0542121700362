/// JSON shapes exchanged between the Task Service and its clients
///
/// Field names follow the established wire format: camelCase, except
/// `custom_class` which has always been snake_case. Dates are `YYYY-MM-DD`.
///
/// ```json
/// {
///   "id": 3, "name": "Design", "start": "2025-02-01", "end": "2025-02-10",
///   "progress": 0, "dependencies": "", "color": "#0288d1",
///   "custom_class": "task-3", "owner": "Alice",
///   "createdAt": "2025-02-01T09:00:00Z", "updatedAt": "2025-02-01T09:00:00Z"
/// }
/// ```

use crate::models::task::{DeletedTask, NewTask, Task, TaskChanges, TaskWithOwner};
use crate::models::user::{ProfileChanges, User};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// A request body that cannot be turned into a store input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidPayload(pub String);

/// Task as served by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i32,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: i32,
    pub dependencies: String,
    pub color: String,
    #[serde(rename = "custom_class")]
    pub custom_class: String,
    /// Owner display name, or handle when the owner has none
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn from_task(task: &Task, owner: impl Into<String>) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            start: task.start_date,
            end: task.end_date,
            progress: task.progress,
            dependencies: task.dependencies.clone(),
            color: task.color.clone(),
            custom_class: task.style_class(),
            owner: owner.into(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl From<&TaskWithOwner> for TaskView {
    fn from(row: &TaskWithOwner) -> Self {
        TaskView::from_task(&row.task, row.owner_display())
    }
}

/// `{message, task}` returned by create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub message: String,
    pub task: TaskView,
}

/// `{message, deletedTask}` returned by delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEnvelope {
    pub message: String,
    pub deleted_task: DeletedTask,
}

/// Body of task create/update requests
///
/// Every field is optional on the wire; which ones are required depends on
/// the operation. `owner` and `currentUser` identify users on the legacy
/// flat routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "custom_class", default, skip_serializing_if = "Option::is_none")]
    pub custom_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

impl TaskPayload {
    /// Builds the input for a create; `name`, `start` and `end` are required
    pub fn to_new_task(&self) -> Result<NewTask, InvalidPayload> {
        let required = || {
            InvalidPayload("Name, start date, and end date are required".to_string())
        };

        let name = non_blank(self.name.as_deref()).ok_or_else(required)?;
        let start = non_blank(self.start.as_deref()).ok_or_else(required)?;
        let end = non_blank(self.end.as_deref()).ok_or_else(required)?;

        Ok(NewTask {
            name: name.to_string(),
            start_date: parse_date("start", start)?,
            end_date: parse_date("end", end)?,
            progress: self.progress,
            dependencies: self.dependencies.clone(),
            color: self.color.clone(),
            custom_class: self.custom_class.clone().filter(|c| !c.trim().is_empty()),
        })
    }

    /// Builds the input for an update; at least one field must be present
    pub fn to_changes(&self) -> Result<TaskChanges, InvalidPayload> {
        let name = match self.name.as_deref() {
            Some(name) if name.trim().is_empty() => {
                return Err(InvalidPayload("Task name cannot be empty".to_string()))
            }
            other => other.map(str::to_string),
        };

        let changes = TaskChanges {
            name,
            start_date: self.start.as_deref().map(|s| parse_date("start", s)).transpose()?,
            end_date: self.end.as_deref().map(|s| parse_date("end", s)).transpose()?,
            progress: self.progress,
            dependencies: self.dependencies.clone(),
            color: self.color.clone(),
        };

        if changes.is_empty() {
            return Err(InvalidPayload("No fields to update".to_string()));
        }
        Ok(changes)
    }
}

/// Parses a wire date: `YYYY-MM-DD`, or an RFC 3339 timestamp (date part kept)
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, InvalidPayload> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InvalidPayload(format!("{} date cannot be empty", field)));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| InvalidPayload(format!("Invalid {} date: {}", field, value)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Row of `GET /api/users/all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at,
        }
    }
}

/// `GET /api/users/:username`: who an identifier resolves to
///
/// `display_name` is the exact string the server puts in a task's `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: i32,
    pub username: String,
    pub display_name: String,
}

impl UserIdentity {
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.username == identifier || self.display_name == identifier
    }
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
        }
    }
}

/// The caller's own profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `PUT /api/users/profile`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            full_name: self.full_name,
            email: self.email,
        }
    }
}

/// `{message, user}` returned by a profile update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub message: String,
    pub user: UserProfile,
}

/// Body of `POST /api/auth/login`; `username` may also be an email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
