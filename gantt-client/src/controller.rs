/// Client state controller
///
/// Holds the task list for one viewer and mediates between the Task Service
/// and the local cache. The server is authoritative:
///
/// ```text
/// load()     server ──ok──> list, cache (replaced wholesale)      Fresh
///                   └─err─> cache ──hit──> list                  Stale
///                                 └─miss─> empty list, notice    Unavailable
///
/// create()   server ──ok──> list (server's record) ──Fresh──> cache
/// update()          │                              └─other──> refetch, then cache
/// delete()          └─err─> notice; list and cache untouched
/// ```
///
/// A snapshot therefore always holds one server answer; a mutation made
/// while offline data is shown never restamps it.
///
/// Editing or deleting a task owned by someone else is refused locally
/// before any request is sent; the server enforces the same rule.
///
/// Individual and team views are both computed from the one list
/// ([`ClientStateController::visible_tasks`]); neither is stored.
///
/// The viewer may be given by handle or display name. Each successful load
/// resolves it through the server to a [`UserIdentity`], whose display name is
/// the string the server puts in each task's `owner` field. Until that
/// happens the viewer string is compared as given.

use crate::api::TaskApi;
use crate::cache::{CachedTasks, LocalCache};
use crate::error::{ClientError, ClientResult};
use chrono::{DateTime, NaiveDate, Utc};
use gantt_shared::models::task::DeletedTask;
use gantt_shared::wire::{TaskPayload, TaskView, UserIdentity};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which tasks the viewer is looking at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewScope {
    /// The viewer's own tasks
    #[default]
    Individual,

    /// Everyone's tasks, labelled with their owner
    Team,
}

impl FromStr for ViewScope {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "mine" => Ok(ViewScope::Individual),
            "team" | "all" => Ok(ViewScope::Team),
            other => Err(ClientError::Invalid(format!("Unknown view: {}", other))),
        }
    }
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewScope::Individual => write!(f, "individual"),
            ViewScope::Team => write!(f, "team"),
        }
    }
}

/// Where the current list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    NotLoaded,

    /// Straight from the server
    Fresh { fetched_at: DateTime<Utc> },

    /// Server unreachable; showing the cached snapshot
    Stale { saved_at: DateTime<Utc> },

    /// Server unreachable and nothing cached
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// A task to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: Option<i32>,
    pub dependencies: Option<String>,
    pub color: Option<String>,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            progress: None,
            dependencies: None,
            color: None,
        }
    }

    fn to_payload(&self) -> ClientResult<TaskPayload> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Invalid(
                "Name, start date, and end date are required".to_string(),
            ));
        }
        Ok(TaskPayload {
            name: Some(self.name.trim().to_string()),
            start: Some(self.start.to_string()),
            end: Some(self.end.to_string()),
            progress: self.progress,
            dependencies: self.dependencies.clone(),
            color: self.color.clone(),
            ..Default::default()
        })
    }
}

/// Fields to change on an existing task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<i32>,
    pub dependencies: Option<String>,
    pub color: Option<String>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.progress.is_none()
            && self.dependencies.is_none()
            && self.color.is_none()
    }

    fn to_payload(&self) -> ClientResult<TaskPayload> {
        if self.is_empty() {
            return Err(ClientError::Invalid("No fields to update".to_string()));
        }
        Ok(TaskPayload {
            name: self.name.clone(),
            start: self.start.map(|d| d.to_string()),
            end: self.end.map(|d| d.to_string()),
            progress: self.progress,
            dependencies: self.dependencies.clone(),
            color: self.color.clone(),
            ..Default::default()
        })
    }
}

/// A task as the current view presents it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleTask {
    pub task: TaskView,

    /// Name as displayed; prefixed with `[owner]` in the team view
    pub label: String,

    /// Whether the viewer owns the task
    pub editable: bool,
}

pub struct ClientStateController {
    api: Arc<dyn TaskApi>,
    cache: Arc<dyn LocalCache>,
    viewer: String,
    identity: Option<UserIdentity>,
    scope: ViewScope,
    tasks: Vec<TaskView>,
    freshness: Freshness,
    notices: Vec<Notice>,
}

impl ClientStateController {
    pub fn new(
        api: Arc<dyn TaskApi>,
        cache: Arc<dyn LocalCache>,
        viewer: impl Into<String>,
        scope: ViewScope,
    ) -> Self {
        Self {
            api,
            cache,
            viewer: viewer.into(),
            identity: None,
            scope,
            tasks: Vec::new(),
            freshness: Freshness::NotLoaded,
            notices: Vec::new(),
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// The account the viewer resolved to, once known
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn scope(&self) -> ViewScope {
        self.scope
    }

    /// Switches view; no refetch, the list already holds every task
    pub fn set_scope(&mut self, scope: ViewScope) {
        self.scope = scope;
    }

    /// Every known task, in server order
    pub fn tasks(&self) -> &[TaskView] {
        &self.tasks
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drains pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn find(&self, task_id: i32) -> Option<&TaskView> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn owns(&self, task: &TaskView) -> bool {
        let owner_name = match &self.identity {
            Some(identity) => identity.display_name.as_str(),
            None => self.viewer.as_str(),
        };
        task.owner == owner_name
    }

    /// Path segment naming the viewer; the handle once it is known
    fn path_user(&self) -> &str {
        match &self.identity {
            Some(identity) => &identity.username,
            None => &self.viewer,
        }
    }

    /// Fetches from the server, falling back to the cache when it fails
    pub async fn load(&mut self) -> Freshness {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Tasks fetched");
                self.tasks = tasks;
                self.freshness = Freshness::Fresh {
                    fetched_at: Utc::now(),
                };
                self.resolve_viewer().await;
                self.persist().await;
            }
            Err(e) => {
                warn!(error = %e, "Task fetch failed, falling back to cache");
                self.fall_back_to_cache().await;
            }
        }
        self.freshness
    }

    async fn resolve_viewer(&mut self) {
        match self.api.find_user(&self.viewer).await {
            Ok(identity) => {
                debug!(user_id = identity.id, username = %identity.username, "Viewer resolved");
                self.identity = Some(identity);
            }
            Err(e) if e.status() == Some(404) => {
                warn!(viewer = %self.viewer, "Viewer is not a known account");
                self.identity = None;
                self.notices.push(Notice::new(
                    NoticeLevel::Error,
                    format!("Unknown user: {}", self.viewer),
                ));
            }
            Err(e) => warn!(error = %e, "Viewer lookup failed"),
        }
    }

    async fn fall_back_to_cache(&mut self) {
        let snapshot = match self.cache.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Task cache unreadable");
                None
            }
        };

        match snapshot {
            Some(snapshot) => {
                if self.identity.is_none() {
                    self.identity = snapshot
                        .viewer
                        .filter(|identity| identity.is_identified_by(&self.viewer));
                }
                self.tasks = snapshot.tasks;
                self.freshness = Freshness::Stale {
                    saved_at: snapshot.saved_at,
                };
                self.notices.push(Notice::new(
                    NoticeLevel::Warning,
                    format!(
                        "Server unreachable; showing tasks saved at {}",
                        snapshot.saved_at.format("%d/%m/%Y %H:%M")
                    ),
                ));
            }
            None => {
                self.tasks.clear();
                self.freshness = Freshness::Unavailable;
                self.notices.push(Notice::new(
                    NoticeLevel::Error,
                    "Could not load tasks. Check that the server is running.",
                ));
            }
        }
    }

    /// Tasks for the current scope
    pub fn visible_tasks(&self) -> Vec<VisibleTask> {
        match self.scope {
            ViewScope::Individual => self
                .tasks
                .iter()
                .filter(|t| self.owns(t))
                .map(|t| VisibleTask {
                    task: t.clone(),
                    label: t.name.clone(),
                    editable: true,
                })
                .collect(),
            ViewScope::Team => self
                .tasks
                .iter()
                .map(|t| VisibleTask {
                    task: t.clone(),
                    label: format!("[{}] {}", t.owner, t.name),
                    editable: self.owns(t),
                })
                .collect(),
        }
    }

    /// Creates a task owned by the viewer
    pub async fn create(&mut self, draft: TaskDraft) -> ClientResult<TaskView> {
        let payload = self.checked(draft.to_payload(), "create")?;
        let result = self.api.create_task(self.path_user(), &payload).await;
        let task = self.checked(result, "create")?;

        info!(task_id = task.id, "Task created");
        self.tasks.push(task.clone());
        self.sort();
        self.write_through().await;
        Ok(task)
    }

    pub async fn update(&mut self, task_id: i32, edit: TaskEdit) -> ClientResult<TaskView> {
        let owned = self.ensure_owned(task_id, "update");
        self.checked(owned, "update")?;
        let payload = self.checked(edit.to_payload(), "update")?;

        let result = self.api.update_task(self.path_user(), task_id, &payload).await;
        let task = self.checked(result, "update")?;

        info!(task_id, "Task updated");
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(slot) => *slot = task.clone(),
            None => self.tasks.push(task.clone()),
        }
        self.sort();
        self.write_through().await;
        Ok(task)
    }

    pub async fn delete(&mut self, task_id: i32) -> ClientResult<DeletedTask> {
        let owned = self.ensure_owned(task_id, "delete");
        self.checked(owned, "delete")?;

        let result = self.api.delete_task(self.path_user(), task_id).await;
        let deleted = self.checked(result, "delete")?;

        info!(task_id, "Task deleted");
        self.tasks.retain(|t| t.id != task_id);
        self.write_through().await;
        Ok(deleted)
    }

    /// Refuses tasks known to belong to someone else
    ///
    /// Unknown ids pass; the server answers for them.
    fn ensure_owned(&self, task_id: i32, action: &'static str) -> ClientResult<()> {
        match self.find(task_id) {
            Some(task) if !self.owns(task) => Err(ClientError::NotOwner { action }),
            _ => Ok(()),
        }
    }

    /// Records a notice for a failed step and passes the result through
    fn checked<T>(&mut self, result: ClientResult<T>, action: &str) -> ClientResult<T> {
        if let Err(e) = &result {
            warn!(error = %e, action, "Task change rejected");
            self.notices.push(Notice::new(
                NoticeLevel::Error,
                format!("Could not {} the task: {}", action, e),
            ));
        }
        result
    }

    /// Caches the list after a confirmed mutation
    ///
    /// A fresh list is one server answer plus this change. Anything else is
    /// refetched first; when that fails the cache keeps its last snapshot.
    async fn write_through(&mut self) {
        if matches!(self.freshness, Freshness::Fresh { .. }) {
            self.persist().await;
            return;
        }

        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Tasks refetched after change");
                self.tasks = tasks;
                self.freshness = Freshness::Fresh {
                    fetched_at: Utc::now(),
                };
                self.persist().await;
            }
            Err(e) => warn!(error = %e, "Refetch after change failed, cache left as saved"),
        }
    }

    /// Mirrors the list into the cache; failures only cost offline fallback
    async fn persist(&mut self) {
        let snapshot = CachedTasks::now(self.tasks.clone()).with_viewer(self.identity.clone());
        if let Err(e) = self.cache.save(&snapshot).await {
            warn!(error = %e, "Task cache not updated");
            self.notices.push(Notice::new(
                NoticeLevel::Info,
                "Local copy of tasks could not be saved",
            ));
        }
    }

    /// Server order: start date, then owner
    fn sort(&mut self) {
        self.tasks.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.owner.cmp(&b.owner))
                .then(a.id.cmp(&b.id))
        });
    }
}
