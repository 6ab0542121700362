/// Database models for the Gantt task store
///
/// # Models
///
/// - `user`: Identities that own tasks
/// - `task`: Timeline entries and their create/update inputs
///
/// Queries live behind [`crate::store::TaskStore`]; these types are plain
/// data shared by every backend.

pub mod task;
pub mod user;

pub use task::{DeletedTask, NewTask, Task, TaskChanges, TaskWithOwner, DEFAULT_TASK_COLOR};
pub use user::{CreateUser, ProfileChanges, User, UserOrder};
