//! Durable watched collection.
//!
//! [`CollectionStore`] keeps the user's watched records in memory and writes
//! the whole list through to a [`KeyValueStore`] on every change. Reads happen
//! once, lazily, on first use.

use popcorn_models::WatchedRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Namespace holding the serialized collection
pub const WATCHED_NAMESPACE: &str = "watched";

/// Namespace receiving an unreadable collection before it is replaced
pub const WATCHED_BACKUP_NAMESPACE: &str = "watched.bak";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize watched collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable string storage keyed by namespace. No transactions.
pub trait KeyValueStore: Send {
    fn get(&self, namespace: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, namespace: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<namespace>.json` file per key inside a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(namespace);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, namespace: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        // Atomic write: write to temp file, then rename
        let path = self.path_for(namespace);
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    values: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(namespace: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(namespace.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, namespace: &str) -> Option<&str> {
        self.values.get(namespace).map(String::as_str)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(namespace).cloned())
    }

    fn set(&mut self, namespace: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}

/// The user's watched list, in insertion order.
pub struct CollectionStore<K: KeyValueStore> {
    backend: K,
    records: Option<Vec<WatchedRecord>>,
}

impl<K: KeyValueStore> CollectionStore<K> {
    pub fn new(backend: K) -> Self {
        Self {
            backend,
            records: None,
        }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Current collection, reading durable storage on first call.
    pub fn load(&mut self) -> &[WatchedRecord] {
        self.records_mut()
    }

    pub fn contains(&mut self, id: &str) -> bool {
        self.load().iter().any(|record| record.id == id)
    }

    pub fn find(&mut self, id: &str) -> Option<&WatchedRecord> {
        self.load().iter().find(|record| record.id == id)
    }

    /// Add a record and write the collection through. Duplicate ids are not
    /// rejected here.
    pub fn append(&mut self, record: WatchedRecord) -> Result<(), StorageError> {
        let mut next = self.records_mut().clone();
        info!(id = %record.id, title = %record.title, "Adding movie to watched list");
        next.push(record);
        self.write_through(next)
    }

    /// Remove a record by id. Returns `false` without writing when the id is
    /// not in the collection.
    pub fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let current = self.records_mut();
        if !current.iter().any(|record| record.id == id) {
            debug!(id, "Remove requested for movie not in watched list");
            return Ok(false);
        }

        let next: Vec<WatchedRecord> = current.iter().filter(|record| record.id != id).cloned().collect();
        self.write_through(next)?;
        info!(id, "Removed movie from watched list");
        Ok(true)
    }

    fn write_through(&mut self, next: Vec<WatchedRecord>) -> Result<(), StorageError> {
        let serialized = serde_json::to_string_pretty(&next)?;
        self.backend.set(WATCHED_NAMESPACE, &serialized)?;
        self.records = Some(next);
        Ok(())
    }

    fn records_mut(&mut self) -> &mut Vec<WatchedRecord> {
        if self.records.is_none() {
            let loaded = self.read_durable();
            self.records = Some(loaded);
        }
        self.records.get_or_insert_with(Vec::new)
    }

    fn read_durable(&mut self) -> Vec<WatchedRecord> {
        let raw = match self.backend.get(WATCHED_NAMESPACE) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No watched list stored yet, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read watched list: {}. Starting with an empty list.", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<WatchedRecord>>(&raw) {
            Ok(records) => {
                info!("Loaded watched list ({} movies)", records.len());
                records
            }
            Err(e) => {
                if let Err(backup_err) = self.backend.set(WATCHED_BACKUP_NAMESPACE, &raw) {
                    warn!(
                        "Watched list is unreadable ({}) and could not be backed up: {}. Starting with an empty list.",
                        e, backup_err
                    );
                } else {
                    warn!(
                        "Watched list is unreadable ({}). Backed it up to '{}' and starting with an empty list.",
                        e, WATCHED_BACKUP_NAMESPACE
                    );
                }
                Vec::new()
            }
        }
    }
}
