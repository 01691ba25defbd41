//! Blob storage for whole-collection snapshots.

/// One JSON file per key under a directory.
pub mod file;
/// SQLite-backed blob table.
pub mod sqlite;

use std::{
    error::Error,
    fmt::{Display, Formatter},
    sync::{Arc, Mutex},
};

use hashbrown::HashMap;

/// Failure reading or writing the backing blob store.
#[derive(Debug)]
pub enum PersistError {
    /// SQLite failure.
    Sqlite(rusqlite::Error),
    /// Snapshot encoding failure.
    Serde(serde_json::Error),
    /// Filesystem failure.
    Io(std::io::Error),
    /// Any other backing failure.
    Message(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "snapshot encoding error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Message(message) => write!(f, "{message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Message(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Result alias for blob store operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Key-value blob storage holding whole-collection snapshots.
pub trait BlobStore: Send {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> PersistResult<Option<String>>;
    /// Overwrites the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> PersistResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn get(&self, key: &str) -> PersistResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> PersistResult<()> {
        (**self).set(key, value)
    }
}

/// In-memory blob store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `value` under `key`.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut blobs) = store.blobs.lock() {
            blobs.insert(key.to_string(), value.into());
        }
        store
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> PersistResult<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| PersistError::Message("memory blob store poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| PersistError::Message("memory blob store poisoned".to_string()))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
