/// Task store
///
/// The persistence boundary of the tracker. Route handlers hold an
/// `Arc<dyn TaskStore>` and never touch SQL directly.
///
/// # Backends
///
/// - [`postgres::PgStore`]: the authoritative production store (sqlx)
/// - [`memory::MemoryStore`]: in-process store for tests and demos
///
/// # Ownership
///
/// Task mutations are scoped by owner. Both backends read the task's current
/// owner and apply the mutation inside one critical section (a transaction
/// holding a row lock, or the write lock), so the answer is always one of:
///
/// | Outcome              | Meaning                                   |
/// |----------------------|-------------------------------------------|
/// | `Scoped::Done(t)`    | mutation applied                          |
/// | `Scoped::Missing`    | no task with that id                      |
/// | `Scoped::NotOwner`   | task exists but belongs to someone else   |
///
/// # Example
///
/// ```no_run
/// use gantt_shared::models::task::NewTask;
/// use gantt_shared::store::{memory::MemoryStore, Scoped, TaskStore};
/// use chrono::NaiveDate;
///
/// # async fn example(owner_id: i32) -> Result<(), gantt_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
///
/// let task = store.insert_task(owner_id, NewTask::new("Design", start, end)).await?;
///
/// match store.delete_task(owner_id + 1, task.id).await? {
///     Scoped::NotOwner { owner_id } => println!("owned by {}", owner_id),
///     other => println!("unexpected: {:?}", other),
/// }
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::task::{DeletedTask, NewTask, Task, TaskChanges, TaskWithOwner};
use crate::models::user::{CreateUser, ProfileChanges, User, UserOrder};
use async_trait::async_trait;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input violates a row invariant (empty name, end before start, ...)
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was hit
    #[error("{0}")]
    Conflict(String),

    /// The backend failed
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default();
                let message = if constraint.contains("email") {
                    "Email already in use"
                } else if constraint.contains("username") {
                    "Username already in use"
                } else {
                    "Record already exists"
                };
                return StoreError::Conflict(message.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::Validation("Referenced user does not exist".to_string());
            }
            if db_err.is_check_violation() {
                return StoreError::Validation(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result of an owner-scoped mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scoped<T> {
    /// The mutation was applied
    Done(T),

    /// No task with the given id exists
    Missing,

    /// The task exists but is owned by `owner_id`
    NotOwner { owner_id: i32 },
}

impl<T> Scoped<T> {
    /// Returns the value if the mutation was applied
    pub fn done(self) -> Option<T> {
        match self {
            Scoped::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scoped<U> {
        match self {
            Scoped::Done(value) => Scoped::Done(f(value)),
            Scoped::Missing => Scoped::Missing,
            Scoped::NotOwner { owner_id } => Scoped::NotOwner { owner_id },
        }
    }
}

/// Which tasks a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task, ordered by start date then owner display name
    All,

    /// One owner's tasks, ordered by start date
    Owner(i32),
}

/// Persistence operations used by the Task Service
///
/// Ties in every listing are broken by ascending id.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Inserts a user; `Conflict` if the handle or email is taken
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Exact match on handle OR display name
    ///
    /// A handle match beats a display-name match; among equals the lowest id
    /// wins.
    async fn find_user_by_handle_or_name(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Exact match on handle OR email, for sign-in
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self, order: UserOrder) -> Result<Vec<User>, StoreError>;

    /// Applies profile changes; `None` if the user does not exist
    ///
    /// `Conflict` if the email belongs to another account, or if the full name
    /// is another account's handle or display name.
    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskWithOwner>, StoreError>;

    async fn find_task(&self, task_id: i32) -> Result<Option<Task>, StoreError>;

    /// Inserts a task for `owner_id`, filling defaults
    async fn insert_task(&self, owner_id: i32, task: NewTask) -> Result<Task, StoreError>;

    /// Applies the present fields of `changes` if `owner_id` owns the task
    async fn update_task(
        &self,
        owner_id: i32,
        task_id: i32,
        changes: TaskChanges,
    ) -> Result<Scoped<Task>, StoreError>;

    /// Deletes the task if `owner_id` owns it
    async fn delete_task(
        &self,
        owner_id: i32,
        task_id: i32,
    ) -> Result<Scoped<DeletedTask>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_map_keeps_outcome() {
        let done: Scoped<i32> = Scoped::Done(2);
        assert_eq!(done.map(|v| v * 10), Scoped::Done(20));

        let not_owner: Scoped<i32> = Scoped::NotOwner { owner_id: 4 };
        assert_eq!(not_owner.map(|v| v * 10), Scoped::NotOwner { owner_id: 4 });

        assert_eq!(Scoped::<i32>::Missing.done(), None);
    }

    #[test]
    fn test_plain_sqlx_errors_are_database_errors() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
