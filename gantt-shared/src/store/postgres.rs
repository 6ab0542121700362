/// PostgreSQL task store
///
/// Runtime-checked sqlx queries against the schema in `migrations/`.
/// Owner-scoped mutations lock the task row with `SELECT ... FOR UPDATE`
/// before the scoped `UPDATE`/`DELETE`, so the reported outcome always
/// matches what the mutation saw.

use super::{Scoped, StoreError, TaskScope, TaskStore};
use crate::models::task::{DeletedTask, NewTask, Task, TaskChanges, TaskWithOwner, DEFAULT_TASK_COLOR};
use crate::models::user::{CreateUser, ProfileChanges, User, UserOrder};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, created_at, updated_at";

const TASK_COLUMNS: &str = "id, user_id, name, start_date, end_date, progress, dependencies, \
                            color, custom_class, created_at, updated_at";

const JOINED_TASK_COLUMNS: &str = "t.id, t.user_id, t.name, t.start_date, t.end_date, t.progress, \
                                   t.dependencies, t.color, t.custom_class, t.created_at, \
                                   t.updated_at, u.username AS owner_username, \
                                   u.full_name AS owner_full_name";

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::pool::ping(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, full_name) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.full_name)
            .fetch_one(&self.pool)
            .await?;

        debug!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_handle_or_name(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR full_name = $1 \
             ORDER BY (username = $1) DESC, id LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1 ORDER BY id LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self, order: UserOrder) -> Result<Vec<User>, StoreError> {
        let order_by = match order {
            UserOrder::DisplayName => {
                "COALESCE(NULLIF(TRIM(full_name), ''), username) ASC, id ASC"
            }
            UserOrder::NewestFirst => "created_at DESC, id DESC",
        };
        let query = format!("SELECT {} FROM users ORDER BY {}", USER_COLUMNS, order_by);
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(full_name) = &changes.full_name {
            let taken: Option<(i32,)> = sqlx::query_as(
                "SELECT id FROM users WHERE id <> $1 \
                 AND (username = $2 OR full_name = $2) \
                 LIMIT 1",
            )
            .bind(user_id)
            .bind(full_name)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some((other,)) = taken {
                debug!(user_id, other, "Profile name refused");
                return Err(StoreError::Conflict("Name already in use".to_string()));
            }
        }

        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if changes.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if changes.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(user_id);
        if let Some(full_name) = changes.full_name {
            q = q.bind(full_name);
        }
        if let Some(email) = changes.email {
            q = q.bind(email);
        }

        let user = q.fetch_optional(&mut *tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskWithOwner>, StoreError> {
        let tasks = match scope {
            TaskScope::All => {
                let query = format!(
                    "SELECT {} FROM tasks t JOIN users u ON u.id = t.user_id \
                     ORDER BY t.start_date ASC, \
                              COALESCE(NULLIF(TRIM(u.full_name), ''), u.username) ASC, \
                              t.id ASC",
                    JOINED_TASK_COLUMNS
                );
                sqlx::query_as::<_, TaskWithOwner>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
            TaskScope::Owner(owner_id) => {
                let query = format!(
                    "SELECT {} FROM tasks t JOIN users u ON u.id = t.user_id \
                     WHERE t.user_id = $1 \
                     ORDER BY t.start_date ASC, t.id ASC",
                    JOINED_TASK_COLUMNS
                );
                sqlx::query_as::<_, TaskWithOwner>(&query)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(tasks)
    }

    async fn find_task(&self, task_id: i32) -> Result<Option<Task>, StoreError> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert_task(&self, owner_id: i32, task: NewTask) -> Result<Task, StoreError> {
        task.validate()?;

        let color = task
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TASK_COLOR.to_string());

        let query = format!(
            "INSERT INTO tasks (user_id, name, start_date, end_date, progress, dependencies, \
                                color, custom_class) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .bind(task.name)
            .bind(task.start_date)
            .bind(task.end_date)
            .bind(task.progress.unwrap_or(0))
            .bind(task.dependencies.unwrap_or_default())
            .bind(color)
            .bind(task.custom_class)
            .fetch_one(&self.pool)
            .await?;

        debug!(task_id = created.id, owner_id, "Task inserted");
        Ok(created)
    }

    async fn update_task(
        &self,
        owner_id: i32,
        task_id: i32,
        changes: TaskChanges,
    ) -> Result<Scoped<Task>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM tasks WHERE id = $1 FOR UPDATE", TASK_COLUMNS);
        let current = sqlx::query_as::<_, Task>(&select)
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?;

        let current = match current {
            Some(task) => task,
            None => return Ok(Scoped::Missing),
        };
        if current.user_id != owner_id {
            debug!(task_id, owner_id, actual_owner = current.user_id, "Update refused");
            return Ok(Scoped::NotOwner {
                owner_id: current.user_id,
            });
        }
        changes.validate_against(&current)?;

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if changes.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if changes.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if changes.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }
        if changes.progress.is_some() {
            bind_count += 1;
            query.push_str(&format!(", progress = ${}", bind_count));
        }
        if changes.dependencies.is_some() {
            bind_count += 1;
            query.push_str(&format!(", dependencies = ${}", bind_count));
        }
        if changes.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {}",
            TASK_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(task_id).bind(owner_id);
        if let Some(name) = changes.name {
            q = q.bind(name);
        }
        if let Some(start_date) = changes.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = changes.end_date {
            q = q.bind(end_date);
        }
        if let Some(progress) = changes.progress {
            q = q.bind(progress);
        }
        if let Some(dependencies) = changes.dependencies {
            q = q.bind(dependencies);
        }
        if let Some(color) = changes.color {
            q = q.bind(color);
        }

        let updated = q.fetch_optional(&mut *tx).await?;
        tx.commit().await?;

        Ok(match updated {
            Some(task) => Scoped::Done(task),
            None => Scoped::Missing,
        })
    }

    async fn delete_task(
        &self,
        owner_id: i32,
        task_id: i32,
    ) -> Result<Scoped<DeletedTask>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(i32,)> =
            sqlx::query_as("SELECT user_id FROM tasks WHERE id = $1 FOR UPDATE")
                .bind(task_id)
                .fetch_optional(&mut *tx)
                .await?;

        match current {
            None => return Ok(Scoped::Missing),
            Some((actual_owner,)) if actual_owner != owner_id => {
                debug!(task_id, owner_id, actual_owner, "Delete refused");
                return Ok(Scoped::NotOwner {
                    owner_id: actual_owner,
                });
            }
            Some(_) => {}
        }

        let deleted = sqlx::query_as::<_, DeletedTask>(
            "DELETE FROM tasks WHERE id = $1 AND user_id = $2 RETURNING id, name",
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(match deleted {
            Some(task) => Scoped::Done(task),
            None => Scoped::Missing,
        })
    }
}
