//! Key-value storage backends for persisted state.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend rejected the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Where persisted state lives.
///
/// The engine reads on startup and writes behind every relevant change, so
/// implementations should make `set` atomic: a crash mid-write must leave
/// either the old value or the new one, never a torn file.
pub trait Storage: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Durably store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Shared handles work as storage too, so a caller can keep one side of an
/// `Arc` and hand the other to the engine.
impl<S: Storage> Storage for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.as_ref().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.as_ref().set(key, value).await
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// File-backed storage, one file per key.
///
/// Writes go to a temp file first and rename into place, so readers never
/// observe a partial write.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // keys become file names; anything outside [A-Za-z0-9_-] is escaped
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicU32,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, to exercise degraded storage.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("root").await.unwrap().is_none());

        storage.set("root", r#"{"version":1}"#).await.unwrap();
        assert_eq!(
            storage.get("root").await.unwrap().as_deref(),
            Some(r#"{"version":1}"#)
        );
    }

    #[tokio::test]
    async fn test_memory_storage_write_failure() {
        let storage = MemoryStorage::new();
        storage.set("root", "first").await.unwrap();

        storage.fail_writes(true);
        assert!(storage.set("root", "second").await.is_err());

        // the old value survives the failed write
        assert_eq!(storage.get("root").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.get("root").await.unwrap().is_none());
        storage.set("root", "hello").await.unwrap();
        assert_eq!(storage.get("root").await.unwrap().as_deref(), Some("hello"));

        storage.set("root", "replaced").await.unwrap();
        assert_eq!(
            storage.get("root").await.unwrap().as_deref(),
            Some("replaced")
        );
    }

    #[tokio::test]
    async fn test_file_storage_escapes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("a/b:c", "value").await.unwrap();
        assert_eq!(
            storage.get("a/b:c").await.unwrap().as_deref(),
            Some("value")
        );
        assert!(dir.path().join("a_b_c.json").exists());
    }
}
