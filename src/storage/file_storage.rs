use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, error, info};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::KeyValueStore;

/// Key-value store persisted as one JSON object on disk.
///
/// The whole document is kept in memory and rewritten after every change
/// (write to `<file>.tmp`, then rename), mirroring how browser local storage
/// is flushed. Entries are written in key order so the file diffs cleanly.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`, creating parent directories as needed.
    /// A missing file is an empty store.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create storage dir {}: {}", parent.display(), e);
                    StorageError::WriteFailed
                })?;
            }
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read store {}: {}", path.display(), e);
                StorageError::ReadFailed
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    error!("Store {} is not a JSON object of strings: {}", path.display(), e);
                    StorageError::CorruptValue(path.display().to_string())
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!("FileStorage initialized at {} ({} key(s))", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(entries).map_err(|_| StorageError::WriteFailed)?;
        let mut f = File::create(&tmp).map_err(|e| {
            error!("Failed to create {}: {}", tmp.display(), e);
            StorageError::WriteFailed
        })?;
        f.write_all(json.as_bytes())
            .and_then(|_| f.sync_all())
            .map_err(|e| {
                error!("Failed to write {}: {}", tmp.display(), e);
                StorageError::WriteFailed
            })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            error!("Failed to replace {}: {}", self.path.display(), e);
            StorageError::WriteFailed
        })?;
        debug!("Flushed {} key(s) to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::ReadFailed)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::WriteFailed)?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // keep memory and disk in agreement
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::WriteFailed)?;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.flush(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::ReadFailed)?;
        Ok(entries.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::WriteFailed)?;
        let snapshot = std::mem::take(&mut *entries);
        if let Err(e) = self.flush(&entries) {
            *entries = snapshot;
            return Err(e);
        }
        info!("Cleared store {}", self.path.display());
        Ok(())
    }
}
