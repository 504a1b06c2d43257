//! Secondary persistence of the latest token info blob, kept for recovery.
//! The session only ever writes here; reading the backup back is left to
//! whoever operates the recovery path.

use crate::cookies::write_private;
use crate::errors::AuthError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait BackupStore: Send + Sync {
    /// Stores the serialized token info, replacing any previous blob.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the blob cannot be written.
    fn save_token_info(&self, blob: &str) -> Result<(), AuthError>;
}

/// Keeps every write in memory, oldest first.
#[derive(Default)]
pub struct MemoryBackupStore {
    writes: Mutex<Vec<String>>,
}

impl MemoryBackupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latest(&self) -> Option<String> {
        self.writes
            .lock()
            .ok()
            .and_then(|writes| writes.last().cloned())
    }

    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl BackupStore for MemoryBackupStore {
    fn save_token_info(&self, blob: &str) -> Result<(), AuthError> {
        self.writes
            .lock()
            .map_err(|_| AuthError::Storage("backup store lock poisoned".to_string()))?
            .push(blob.to_string());
        Ok(())
    }
}

/// Overwrites one file with the latest blob (owner-only on unix).
pub struct FileBackupStore {
    path: PathBuf,
}

impl FileBackupStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackupStore for FileBackupStore {
    fn save_token_info(&self, blob: &str) -> Result<(), AuthError> {
        write_private(&self.path, blob.as_bytes())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{BackupStore, FileBackupStore, MemoryBackupStore};
    use crate::errors::AuthError;

    #[test]
    fn memory_store_keeps_order() -> Result<(), AuthError> {
        let store = MemoryBackupStore::new();
        assert_eq!(store.latest(), None);
        store.save_token_info("first")?;
        store.save_token_info("second")?;
        assert_eq!(store.latest(), Some("second".to_string()));
        assert_eq!(store.writes(), vec!["first", "second"]);
        Ok(())
    }

    #[test]
    fn file_store_overwrites() -> Result<(), AuthError> {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackupStore::new(dir.path().join("token-backup.json"));
        store.save_token_info("{\"access_token\":\"old\"}")?;
        store.save_token_info("{\"access_token\":\"new\"}")?;
        let stored = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(stored, "{\"access_token\":\"new\"}");
        Ok(())
    }
}
