//! File-backed credential storage.
//!
//! Stores credentials as a small JSON map in the application data
//! directory. This is the backup copy of the session token; it survives
//! keychain resets and lets a session be restored when the canonical
//! copy has gone missing.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;

use super::{CredentialStore, StorageResult};

/// Default file name for the backup credential file.
const BACKUP_FILE_NAME: &str = "session.json";

/// Credential storage backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by the given file path.
    ///
    /// The file and its parent directories are created lazily on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the platform's data directory for Mailmind.
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn in_data_dir() -> Option<Self> {
        let dirs = ProjectDirs::from("io", "mailmind", "mailmind")?;
        Some(Self::new(dirs.data_dir().join(BACKUP_FILE_NAME)))
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> StorageResult<HashMap<String, String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileTokenStore {
    async fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn retrieve(&self, key: &str) -> StorageResult<Option<String>> {
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await
    }
}
