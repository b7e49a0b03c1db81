//! Staging cache and durable store contracts.
//!
//! The cache holds attack logs between the logging worker and the archiver;
//! the durable store is where the archiver puts them for good.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ArchiveConfig, ArchiveStoreKind};

/// Failure talking to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Fast key-value cache used as a staging area.
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    /// Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Long-term storage for archived entries.
pub trait DurableStore: Send + Sync {
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process cache backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key);
        Ok(())
    }
}

/// Durable store that keeps every write in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One line of a [`FileStore`] archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub key: String,
    pub value: String,
    /// Seconds since epoch.
    pub archived_at: u64,
}

/// Durable store appending JSON lines to a file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileStore {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableStore for FileStore {
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let record = ArchivedRecord {
            key: key.to_string(),
            value: value.to_string(),
            archived_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Unavailable("file store mutex poisoned".into()))?;
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Build the durable store selected by the archive configuration.
pub fn durable_from_config(config: &ArchiveConfig) -> Result<Arc<dyn DurableStore>, StoreError> {
    match config.store {
        ArchiveStoreKind::File => Ok(Arc::new(FileStore::open(&config.path)?)),
        ArchiveStoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
