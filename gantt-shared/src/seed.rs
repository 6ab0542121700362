/// Default account provisioning
///
/// Runs at server startup, after migrations. Creates:
///
/// - the administrative account `admin` / `admin@ganttproject.com`
///   (display name `Administrator`, password `admin123`)
/// - the legacy team, one account per name in [`LEGACY_USERS`]; handle is the
///   name lower-cased with whitespace removed, email `<handle>@ganttproject.com`,
///   password `123456`
///
/// Accounts that already exist are left alone, so seeding is idempotent.

use crate::auth::password::{hash_password_with, PasswordCost, PasswordError};
use crate::models::user::CreateUser;
use crate::store::{StoreError, TaskStore};
use thiserror::Error;
use tracing::info;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@ganttproject.com";
pub const ADMIN_FULL_NAME: &str = "Administrator";
pub const ADMIN_PASSWORD: &str = "admin123";

pub const LEGACY_PASSWORD: &str = "123456";
pub const EMAIL_DOMAIN: &str = "ganttproject.com";

/// Display names of the team that predates accounts
pub const LEGACY_USERS: [&str; 5] = [
    "João Victor",
    "João Gabriel",
    "Victor Moreno",
    "Kaique Breno",
    "Lucas Queiroz",
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// What a seeding run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: usize,
}

/// Handle derived from a display name: lower-cased, whitespace removed
pub fn legacy_handle(full_name: &str) -> String {
    full_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Creates the default accounts that are missing
pub async fn seed_default_users(
    store: &dyn TaskStore,
    cost: PasswordCost,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    if store.find_user_by_login(ADMIN_USERNAME).await?.is_some() {
        report.skipped += 1;
    } else {
        store
            .create_user(CreateUser {
                username: ADMIN_USERNAME.to_string(),
                email: ADMIN_EMAIL.to_string(),
                password_hash: hash_password_with(ADMIN_PASSWORD, cost)?,
                full_name: Some(ADMIN_FULL_NAME.to_string()),
            })
            .await?;
        report.created.push(ADMIN_USERNAME.to_string());
    }

    // One hash shared by every legacy account, computed only if needed
    let mut legacy_hash: Option<String> = None;

    for full_name in LEGACY_USERS {
        if store.find_user_by_handle_or_name(full_name).await?.is_some() {
            report.skipped += 1;
            continue;
        }

        let password_hash = match &legacy_hash {
            Some(hash) => hash.clone(),
            None => {
                let hash = hash_password_with(LEGACY_PASSWORD, cost)?;
                legacy_hash = Some(hash.clone());
                hash
            }
        };

        let username = legacy_handle(full_name);
        store
            .create_user(CreateUser {
                email: format!("{}@{}", username, EMAIL_DOMAIN),
                username: username.clone(),
                password_hash,
                full_name: Some(full_name.to_string()),
            })
            .await?;
        report.created.push(username);
    }

    info!(
        created = report.created.len(),
        skipped = report.skipped,
        "Default users seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::models::user::UserOrder;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_legacy_handle() {
        assert_eq!(legacy_handle("João Victor"), "joãovictor");
        assert_eq!(legacy_handle("Lucas  Queiroz"), "lucasqueiroz");
        assert_eq!(legacy_handle("Administrator"), "administrator");
    }

    #[tokio::test]
    async fn test_seed_creates_admin_and_legacy_users() {
        let store = MemoryStore::new();
        let report = seed_default_users(&store, PasswordCost::light()).await.unwrap();

        assert_eq!(report.created.len(), 6);
        assert_eq!(report.skipped, 0);

        let admin = store.find_user_by_login(ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.display_name(), "Administrator");
        assert!(verify_password(ADMIN_PASSWORD, &admin.password_hash).unwrap());

        let joao = store
            .find_user_by_handle_or_name("João Victor")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(joao.username, "joãovictor");
        assert_eq!(joao.email, "joãovictor@ganttproject.com");
        assert!(verify_password(LEGACY_PASSWORD, &joao.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        seed_default_users(&store, PasswordCost::light()).await.unwrap();
        let second = seed_default_users(&store, PasswordCost::light()).await.unwrap();

        assert!(second.created.is_empty());
        assert_eq!(second.skipped, 6);
        assert_eq!(store.list_users(UserOrder::DisplayName).await.unwrap().len(), 6);
    }
}
