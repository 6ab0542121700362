/// Task model
///
/// A task is a bar on the timeline: a named date range with progress, owned
/// by exactly one user for its whole life.
///
/// # Lifecycle
///
/// ```text
/// (absent) --insert(owner)--> stored --update(owner, partial)--> stored
///                                    --delete(owner)----------> (absent)
/// ```
///
/// Every transition after creation is scoped to the owner; see
/// [`crate::store::Scoped`] for how a mismatch is reported.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     start_date DATE NOT NULL,
///     end_date DATE NOT NULL,
///     progress INTEGER NOT NULL DEFAULT 0,
///     dependencies TEXT NOT NULL DEFAULT '',
///     color VARCHAR(32) NOT NULL DEFAULT '#0288d1',
///     custom_class VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::models::user::display_name;
use crate::store::StoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bar color used when a task is created without one
pub const DEFAULT_TASK_COLOR: &str = "#0288d1";

/// A stored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,

    /// Owning user; immutable after creation
    pub user_id: i32,

    /// Non-empty task name
    pub name: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// Percent complete, 0-100 by convention
    pub progress: i32,

    /// Free text, stored but never interpreted
    pub dependencies: String,

    /// Bar color (CSS color string)
    pub color: String,

    /// Explicit styling hook; `None` means derive from the id
    pub custom_class: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Styling hook for this task's bar
    pub fn style_class(&self) -> String {
        match self.custom_class.as_deref() {
            Some(class) if !class.trim().is_empty() => class.to_string(),
            _ => format!("task-{}", self.id),
        }
    }
}

/// A task joined with its owner's identity
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskWithOwner {
    #[sqlx(flatten)]
    pub task: Task,

    pub owner_username: String,

    pub owner_full_name: Option<String>,
}

impl TaskWithOwner {
    /// Owner as shown on the wire: display name, or handle as fallback
    pub fn owner_display(&self) -> &str {
        display_name(self.owner_full_name.as_deref(), &self.owner_username)
    }
}

/// Input for inserting a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to 0
    pub progress: Option<i32>,
    /// Defaults to ""
    pub dependencies: Option<String>,
    /// Defaults to [`DEFAULT_TASK_COLOR`]
    pub color: Option<String>,
    pub custom_class: Option<String>,
}

impl NewTask {
    /// Convenience constructor for the required fields
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            progress: None,
            dependencies: None,
            color: None,
            custom_class: None,
        }
    }

    /// Checks the invariants a row must satisfy before insertion
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation(
                "Name, start date, and end date are required".to_string(),
            ));
        }
        check_date_order(self.start_date, self.end_date)
    }
}

/// Partial update of a task
///
/// Only `Some` fields are written; `updated_at` is always bumped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
    pub dependencies: Option<String>,
    pub color: Option<String>,
}

impl TaskChanges {
    /// True when there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.progress.is_none()
            && self.dependencies.is_none()
            && self.color.is_none()
    }

    /// Validates the changes against the row they will be applied to
    pub fn validate_against(&self, current: &Task) -> Result<(), StoreError> {
        if self.is_empty() {
            return Err(StoreError::Validation("No fields to update".to_string()));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(StoreError::Validation("Task name cannot be empty".to_string()));
            }
        }
        check_date_order(
            self.start_date.unwrap_or(current.start_date),
            self.end_date.unwrap_or(current.end_date),
        )
    }

    /// Writes the changes onto an in-memory row
    pub fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(start_date) = self.start_date {
            task.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            task.end_date = end_date;
        }
        if let Some(progress) = self.progress {
            task.progress = progress;
        }
        if let Some(dependencies) = self.dependencies {
            task.dependencies = dependencies;
        }
        if let Some(color) = self.color {
            task.color = color;
        }
    }
}

/// What a delete hands back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeletedTask {
    pub id: i32,
    pub name: String,
}

/// Rejects ranges that end before they start
pub fn check_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), StoreError> {
    if end < start {
        return Err(StoreError::Validation(format!(
            "End date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task() -> Task {
        Task {
            id: 7,
            user_id: 1,
            name: "Design".to_string(),
            start_date: date("2025-02-01"),
            end_date: date("2025-02-10"),
            progress: 0,
            dependencies: String::new(),
            color: DEFAULT_TASK_COLOR.to_string(),
            custom_class: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_style_class_falls_back_to_id() {
        let mut t = task();
        assert_eq!(t.style_class(), "task-7");

        t.custom_class = Some("bar-legacy-1700000000".to_string());
        assert_eq!(t.style_class(), "bar-legacy-1700000000");
    }

    #[test]
    fn test_new_task_requires_name() {
        let new = NewTask::new("   ", date("2025-02-01"), date("2025-02-10"));
        assert!(matches!(new.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_new_task_rejects_end_before_start() {
        let new = NewTask::new("Design", date("2025-02-10"), date("2025-02-01"));
        assert!(matches!(new.validate(), Err(StoreError::Validation(_))));

        let same_day = NewTask::new("Design", date("2025-02-10"), date("2025-02-10"));
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_changes_validated_against_stored_dates() {
        let current = task();

        let moves_end_too_early = TaskChanges {
            end_date: Some(date("2025-01-15")),
            ..Default::default()
        };
        assert!(moves_end_too_early.validate_against(&current).is_err());

        let extends = TaskChanges {
            end_date: Some(date("2025-03-01")),
            ..Default::default()
        };
        assert!(extends.validate_against(&current).is_ok());

        assert!(TaskChanges::default().validate_against(&current).is_err());
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut t = task();
        TaskChanges {
            progress: Some(75),
            ..Default::default()
        }
        .apply_to(&mut t);

        assert_eq!(t.progress, 75);
        assert_eq!(t.name, "Design");
        assert_eq!(t.end_date, date("2025-02-10"));
    }
}
