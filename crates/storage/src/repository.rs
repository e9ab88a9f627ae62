use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{CheckedState, ProgressRecord};
use thiserror::Error;

/// Key holding the checklist's leaf-id → checked map.
pub const CHECKED_STATE_KEY: &str = "checklist-checked";

/// Key holding the revision progress record.
pub const PROGRESS_RECORD_KEY: &str = "revision-progress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String key-value backend. Values are whole JSON snapshots.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Persistence for the checklist's checked-state snapshot.
#[async_trait]
pub trait CheckedStateRepository: Send + Sync {
    /// Load the stored mapping, or an empty one if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a
    /// valid mapping, or other storage errors.
    async fn load_checked_state(&self) -> Result<CheckedState, StorageError>;

    /// Replace the stored mapping with `state`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_checked_state(&self, state: &CheckedState) -> Result<(), StorageError>;
}

/// Persistence for the revision progress record.
#[async_trait]
pub trait ProgressRecordRepository: Send + Sync {
    /// Load the stored record, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a corrupt record, or other
    /// storage errors.
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> CheckedStateRepository for S {
    async fn load_checked_state(&self) -> Result<CheckedState, StorageError> {
        match self.get(CHECKED_STATE_KEY).await? {
            Some(raw) => decode(CHECKED_STATE_KEY, &raw),
            None => Ok(CheckedState::default()),
        }
    }

    async fn save_checked_state(&self, state: &CheckedState) -> Result<(), StorageError> {
        let raw = encode(CHECKED_STATE_KEY, state)?;
        self.put(CHECKED_STATE_KEY, &raw).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> ProgressRecordRepository for S {
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        self.get(PROGRESS_RECORD_KEY)
            .await?
            .map(|raw| decode(PROGRESS_RECORD_KEY, &raw))
            .transpose()
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let raw = encode(PROGRESS_RECORD_KEY, record)?;
        self.put(PROGRESS_RECORD_KEY, &raw).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the two snapshot repositories behind trait objects for easy
/// backend swapping.
///
/// The checklist and the revision schedule never share a record.
#[derive(Clone)]
pub struct Storage {
    pub checked: Arc<dyn CheckedStateRepository>,
    pub progress: Arc<dyn ProgressRecordRepository>,
}

impl Storage {
    /// Both repositories backed by one key-value store.
    #[must_use]
    pub fn from_store<S: KeyValueStore + Clone + 'static>(store: S) -> Self {
        let checked: Arc<dyn CheckedStateRepository> = Arc::new(store.clone());
        let progress: Arc<dyn ProgressRecordRepository> = Arc::new(store);
        Self { checked, progress }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }
}
