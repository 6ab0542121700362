/// Local task cache
///
/// The cache is a mirror of the last server answer, never a source of
/// truth: the controller replaces it wholesale after every successful fetch
/// and after confirmed mutations to a fresh list, and reads it only when the
/// server is unreachable.
///
/// Two backends:
/// - [`FileCache`]: one JSON document on disk, replaced atomically
/// - [`MemoryCache`]: process-local, for tests and embedding

use crate::error::ClientResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gantt_shared::wire::{TaskView, UserIdentity};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Snapshot of the server's task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTasks {
    /// When the snapshot was taken from a server answer
    pub saved_at: DateTime<Utc>,

    pub tasks: Vec<TaskView>,

    /// Who the viewer resolved to when the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<UserIdentity>,
}

impl CachedTasks {
    pub fn now(tasks: Vec<TaskView>) -> Self {
        Self {
            saved_at: Utc::now(),
            tasks,
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Option<UserIdentity>) -> Self {
        self.viewer = viewer;
        self
    }
}

#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Last saved snapshot, `None` when nothing was ever saved
    async fn load(&self) -> ClientResult<Option<CachedTasks>>;

    /// Replaces the snapshot
    async fn save(&self, snapshot: &CachedTasks) -> ClientResult<()>;
}

/// Snapshot stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn load(&self) -> ClientResult<Option<CachedTasks>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &CachedTasks) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // The file at `path` is always a complete snapshot
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, serde_json::to_vec_pretty(snapshot)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            tasks = snapshot.tasks.len(),
            "Task cache written"
        );
        Ok(())
    }
}

/// In-process snapshot
#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: RwLock<Option<CachedTasks>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a snapshot already present
    pub fn with_snapshot(snapshot: CachedTasks) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn load(&self) -> ClientResult<Option<CachedTasks>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &CachedTasks) -> ClientResult<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use chrono::NaiveDate;

    fn task(id: i32, name: &str) -> TaskView {
        let now = Utc::now();
        TaskView {
            id,
            name: name.to_string(),
            start: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            progress: 0,
            dependencies: String::new(),
            color: "#0288d1".to_string(),
            custom_class: format!("task-{}", id),
            owner: "Alice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_file_cache_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("tasks.json"));
        assert_eq!(cache.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_cache_replaces_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested").join("tasks.json"));

        cache
            .save(&CachedTasks::now(vec![task(1, "Design"), task(2, "Build")]))
            .await
            .unwrap();
        let second = CachedTasks::now(vec![task(3, "Ship")]);
        cache.save(&second).await.unwrap();

        assert_eq!(cache.load().await.unwrap(), Some(second));
        assert!(!dir.path().join("nested").join("tasks.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result = FileCache::new(&path).load().await;
        assert!(matches!(result, Err(ClientError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_file_cache_reads_snapshot_without_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, br#"{"savedAt": "2025-02-01T09:00:00Z", "tasks": []}"#).unwrap();

        let snapshot = FileCache::new(&path).load().await.unwrap().unwrap();
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.viewer, None);
    }

    #[tokio::test]
    async fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert_eq!(cache.load().await.unwrap(), None);

        let snapshot = CachedTasks::now(vec![task(1, "Design")]);
        cache.save(&snapshot).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), Some(snapshot));
    }
}
