//! Filesystem storage for the session keys.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use escooly_core::error::StorageError;
use escooly_core::traits::{SessionStore, StorageKey};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    /// When the document was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    /// Key name to value.
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Session store backed by a single JSON file.
///
/// Every write is a locked read-modify-write: an exclusive advisory lock on
/// a sibling `.lock` file, a write to a temporary file, then a rename over
/// the original. Readers take a shared lock. On Unix the file is readable
/// by its owner only. A missing file is an empty store, and removing the
/// last key deletes the file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at the given file path. Nothing is created until the
    /// first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the store was last written, if it exists.
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.read_shared()?.updated_at)
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    /// Take the advisory lock; released when the returned file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create session directory", e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| StorageError::io("open lock file", e))?;

        let locked = if exclusive {
            lock_file.lock_exclusive()
        } else {
            lock_file.lock_shared()
        };
        locked.map_err(|e| StorageError::io("lock session file", e))?;

        Ok(lock_file)
    }

    /// Read under a shared lock. A missing file reads as empty without
    /// creating the directory or the lock file.
    fn read_shared(&self) -> Result<StoredDocument, StorageError> {
        if !self.path.exists() {
            return Ok(StoredDocument::default());
        }
        let _lock = self.lock(false)?;
        self.read_document()
    }

    fn read_document(&self) -> Result<StoredDocument, StorageError> {
        if !self.path.exists() {
            return Ok(StoredDocument::default());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io("read session file", e))?;

        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write_document(&self, mut document: StoredDocument) -> Result<(), StorageError> {
        if document.entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)
                    .map_err(|e| StorageError::io("remove session file", e))?;
            }
            return Ok(());
        }

        document.updated_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&document).map_err(|e| StorageError::Corrupt {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let temp_path = self.temp_path();
        let mut file =
            File::create(&temp_path).map_err(|e| StorageError::io("create temp file", e))?;

        #[cfg(unix)]
        {
            let mut perms = file
                .metadata()
                .map_err(|e| StorageError::io("read temp file metadata", e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)
                .map_err(|e| StorageError::io("restrict session file", e))?;
        }

        file.write_all(json.as_bytes())
            .map_err(|e| StorageError::io("write session file", e))?;
        file.sync_data()
            .map_err(|e| StorageError::io("sync session file", e))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StorageError::io("replace session file", e))?;

        Ok(())
    }
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}

#[async_trait]
impl SessionStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let document = self.read_shared()?;
        trace!(present = document.entries.contains_key(key.as_str()), "read key");
        Ok(document.entries.get(key.as_str()).cloned())
    }

    #[instrument(skip(self, entries), fields(path = %self.path.display()))]
    async fn set(&self, entries: &[(StorageKey, String)]) -> Result<(), StorageError> {
        let _lock = self.lock(true)?;
        let mut document = self.read_document()?;
        for (key, value) in entries {
            document.entries.insert(key.as_str().to_string(), value.clone());
        }
        self.write_document(document)?;
        debug!(count = entries.len(), "Wrote session keys");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError> {
        let _lock = self.lock(true)?;
        let mut document = self.read_document()?;
        let before = document.entries.len();
        for key in keys {
            document.entries.remove(key.as_str());
        }
        if document.entries.len() != before || document.entries.is_empty() {
            self.write_document(document)?;
        }
        debug!(count = keys.len(), "Removed session keys");
        Ok(())
    }
}
