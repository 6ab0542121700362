/// User model
///
/// Users are the identities tasks belong to. They are provisioned by
/// [`crate::seed`], never deleted by the service, and only their display name
/// and email can change (through the profile endpoint).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     username VARCHAR(50) UNIQUE NOT NULL,
///     email VARCHAR(100) UNIQUE NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i32,

    /// Unique handle (e.g. "admin", "joãovictor")
    pub username: String,

    /// Unique contact address
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub full_name: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown to other users: the full name, or the handle when there is none
    pub fn display_name(&self) -> &str {
        display_name(self.full_name.as_deref(), &self.username)
    }

    /// Whether `identifier` names this user by handle or display name
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.username == identifier || self.full_name.as_deref() == Some(identifier)
    }
}

/// Display-name fallback shared by users and joined task rows
pub fn display_name<'a>(full_name: Option<&'a str>, username: &'a str) -> &'a str {
    match full_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => username,
    }
}

/// Input for provisioning a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Argon2id hash, never plaintext
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// Profile fields a user may change about themselves
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none()
    }
}

/// Sort order for user listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrder {
    /// Alphabetical by display name (the identity picker)
    DisplayName,

    /// Most recently created first (the admin listing)
    NewestFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, full_name: Option<&str>) -> User {
        User {
            id: 1,
            username: username.to_string(),
            email: format!("{}@ganttproject.com", username),
            password_hash: "hash".to_string(),
            full_name: full_name.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user("admin", Some("Administrator")).display_name(), "Administrator");
        assert_eq!(user("admin", None).display_name(), "admin");
        assert_eq!(user("admin", Some("  ")).display_name(), "admin");
    }

    #[test]
    fn test_identified_by_handle_or_full_name() {
        let u = user("joãovictor", Some("João Victor"));
        assert!(u.is_identified_by("joãovictor"));
        assert!(u.is_identified_by("João Victor"));
        assert!(!u.is_identified_by("joao"));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(user("admin", None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "admin");
    }

    #[test]
    fn test_profile_changes_empty() {
        assert!(ProfileChanges::default().is_empty());
        assert!(!ProfileChanges {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
