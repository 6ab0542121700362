/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Liveness probe
/// - `auth`: Sign-in
/// - `users`: Identity picker, admin listing, own profile
/// - `tasks`: Task listing and owner-scoped CRUD

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
