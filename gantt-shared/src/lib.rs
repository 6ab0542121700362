//! # Gantt Shared Library
//!
//! This crate contains the task store, models, and auth primitives used by
//! the Gantt API server and the client state controller.
//!
//! ## Module Organization
//!
//! - `models`: Users and tasks as stored in the relational schema
//! - `store`: The `TaskStore` trait with Postgres and in-memory backends
//! - `db`: Connection pool and migrations
//! - `seed`: Provisioning of the default accounts
//! - `auth`: Password hashing, JWT tokens, request auth context
//! - `wire`: JSON shapes exchanged between server and client

pub mod auth;
pub mod db;
pub mod models;
pub mod seed;
pub mod store;
pub mod wire;

/// Current version of the Gantt shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
