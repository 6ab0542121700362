/// In-memory task store
///
/// Mirrors the PostgreSQL backend's constraints (unique handle and email,
/// owner foreign key, row invariants) behind a single `RwLock`. Every
/// mutation runs inside one write-lock critical section, which gives the same
/// check-then-mutate guarantee as the row lock in [`super::postgres::PgStore`].
///
/// Timestamps are strictly increasing across the whole store so that an
/// update always lands after the insert it follows.

use super::{Scoped, StoreError, TaskScope, TaskStore};
use crate::models::task::{DeletedTask, NewTask, Task, TaskChanges, TaskWithOwner, DEFAULT_TASK_COLOR};
use crate::models::user::{CreateUser, ProfileChanges, User, UserOrder};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    next_user_id: i32,
    next_task_id: i32,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    /// Whether `name` already identifies an account other than `except`
    fn name_taken(&self, name: &str, except: i32) -> bool {
        self.users
            .values()
            .any(|u| u.id != except && u.is_identified_by(name))
    }

    fn with_owner(&self, task: &Task) -> TaskWithOwner {
        let owner = self.users.get(&task.user_id);
        TaskWithOwner {
            task: task.clone(),
            owner_username: owner.map(|u| u.username.clone()).unwrap_or_default(),
            owner_full_name: owner.and_then(|u| u.full_name.clone()),
        }
    }

    /// Resolves the scoped outcome for a task without mutating it
    fn check_owner<T>(&self, owner_id: i32, task_id: i32) -> Option<Scoped<T>> {
        match self.tasks.get(&task_id) {
            None => Some(Scoped::Missing),
            Some(task) if task.user_id != owner_id => Some(Scoped::NotOwner {
                owner_id: task.user_id,
            }),
            Some(_) => None,
        }
    }
}

/// Store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("Username already in use".to_string()));
        }
        if state.email_taken(&data.email, None) {
            return Err(StoreError::Conflict("Email already in use".to_string()));
        }

        state.next_user_id += 1;
        let now = state.tick();
        let user = User {
            id: state.next_user_id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            full_name: data.full_name,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_handle_or_name(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        let by_handle = state.users.values().find(|u| u.username == identifier);
        Ok(by_handle
            .or_else(|| state.users.values().find(|u| u.is_identified_by(identifier)))
            .cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn list_users(&self, order: UserOrder) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        match order {
            UserOrder::DisplayName => users.sort_by(|a, b| {
                a.display_name()
                    .cmp(b.display_name())
                    .then(a.id.cmp(&b.id))
            }),
            UserOrder::NewestFirst => {
                users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
        }
        Ok(users)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(user_id)) {
                return Err(StoreError::Conflict("Email already in use".to_string()));
            }
        }
        if let Some(full_name) = &changes.full_name {
            if state.name_taken(full_name, user_id) {
                return Err(StoreError::Conflict("Name already in use".to_string()));
            }
        }

        let now = state.tick();
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(full_name) = changes.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskWithOwner>, StoreError> {
        let state = self.state.read().await;
        let mut tasks: Vec<TaskWithOwner> = state
            .tasks
            .values()
            .filter(|t| match scope {
                TaskScope::All => true,
                TaskScope::Owner(owner_id) => t.user_id == owner_id,
            })
            .map(|t| state.with_owner(t))
            .collect();

        match scope {
            TaskScope::All => tasks.sort_by(|a, b| {
                a.task
                    .start_date
                    .cmp(&b.task.start_date)
                    .then_with(|| a.owner_display().cmp(b.owner_display()))
                    .then(a.task.id.cmp(&b.task.id))
            }),
            TaskScope::Owner(_) => tasks.sort_by(|a, b| {
                a.task
                    .start_date
                    .cmp(&b.task.start_date)
                    .then(a.task.id.cmp(&b.task.id))
            }),
        }
        Ok(tasks)
    }

    async fn find_task(&self, task_id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.state.read().await.tasks.get(&task_id).cloned())
    }

    async fn insert_task(&self, owner_id: i32, task: NewTask) -> Result<Task, StoreError> {
        task.validate()?;

        let mut state = self.state.write().await;
        if !state.users.contains_key(&owner_id) {
            return Err(StoreError::Validation(
                "Referenced user does not exist".to_string(),
            ));
        }

        state.next_task_id += 1;
        let now = state.tick();
        let created = Task {
            id: state.next_task_id,
            user_id: owner_id,
            name: task.name,
            start_date: task.start_date,
            end_date: task.end_date,
            progress: task.progress.unwrap_or(0),
            dependencies: task.dependencies.unwrap_or_default(),
            color: task
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TASK_COLOR.to_string()),
            custom_class: task.custom_class,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        owner_id: i32,
        task_id: i32,
        changes: TaskChanges,
    ) -> Result<Scoped<Task>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(outcome) = state.check_owner(owner_id, task_id) {
            return Ok(outcome);
        }
        let now = state.tick();
        let Some(task) = state.tasks.get_mut(&task_id) else {
            return Ok(Scoped::Missing);
        };

        changes.validate_against(task)?;
        changes.apply_to(task);
        task.updated_at = now;
        Ok(Scoped::Done(task.clone()))
    }

    async fn delete_task(
        &self,
        owner_id: i32,
        task_id: i32,
    ) -> Result<Scoped<DeletedTask>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(outcome) = state.check_owner(owner_id, task_id) {
            return Ok(outcome);
        }
        Ok(match state.tasks.remove(&task_id) {
            Some(task) => Scoped::Done(DeletedTask {
                id: task.id,
                name: task.name,
            }),
            None => Scoped::Missing,
        })
    }
}
