use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Well-known preference keys.
pub mod keys {
    /// Consecutive-day play count (integer).
    pub const STREAK: &str = "streak";
    /// ISO `YYYY-MM-DD` date of the last counted play (string).
    pub const LAST_PLAYED_DATE: &str = "last_played_date";
    /// Player display name (string).
    pub const USER_NAME: &str = "user_name";
}

/// Durable key-value storage for small scalar preferences.
///
/// Missing keys read as `Ok(None)`. Reading a key through the wrong typed
/// accessor is a `StorageError::Serialization`.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Fetch an integer value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError>;

    /// Store an integer value, replacing any previous value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError>;

    /// Fetch a string value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a string value, replacing any previous value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Store several values at once. Either every entry is written or none is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be stored; nothing is
    /// changed in that case.
    async fn set_many(&self, entries: &[(&str, PreferenceValue)]) -> Result<(), StorageError>;
}

/// A single stored preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Int(i64),
    Text(String),
}

impl PreferenceValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, PreferenceValue>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, key: &str) -> Result<Option<PreferenceValue>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a str, PreferenceValue)>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert(key.to_owned(), value);
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryRepository {
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        match self.read(key)? {
            None => Ok(None),
            Some(PreferenceValue::Int(value)) => Ok(Some(value)),
            Some(PreferenceValue::Text(_)) => Err(StorageError::Serialization(format!(
                "{key} holds a string, not an integer"
            ))),
        }
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.write([(key, PreferenceValue::Int(value))])
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.read(key)? {
            None => Ok(None),
            Some(PreferenceValue::Text(value)) => Ok(Some(value)),
            Some(PreferenceValue::Int(_)) => Err(StorageError::Serialization(format!(
                "{key} holds an integer, not a string"
            ))),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write([(key, PreferenceValue::text(value))])
    }

    async fn set_many(&self, entries: &[(&str, PreferenceValue)]) -> Result<(), StorageError> {
        self.write(entries.iter().map(|(key, value)| (*key, value.clone())))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let preferences: Arc<dyn PreferenceStore> = Arc::new(InMemoryRepository::new());
        Self { preferences }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), None);
        assert_eq!(repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_round_trip_and_overwrite() {
        let repo = InMemoryRepository::new();
        repo.set_int(keys::STREAK, 3).await.unwrap();
        repo.set_int(keys::STREAK, 4).await.unwrap();
        repo.set_string(keys::LAST_PLAYED_DATE, "2024-03-01")
            .await
            .unwrap();

        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(4));
        assert_eq!(
            repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap().as_deref(),
            Some("2024-03-01")
        );
    }

    #[tokio::test]
    async fn wrong_accessor_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.set_string(keys::STREAK, "three").await.unwrap();
        let err = repo.get_int(keys::STREAK).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn set_many_writes_every_entry() {
        let repo = InMemoryRepository::new();
        repo.set_many(&[
            (keys::STREAK, PreferenceValue::Int(5)),
            (keys::LAST_PLAYED_DATE, PreferenceValue::text("2024-03-02")),
        ])
        .await
        .unwrap();

        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(5));
        assert_eq!(
            repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap().as_deref(),
            Some("2024-03-02")
        );
    }

    #[tokio::test]
    async fn storage_clones_share_the_same_backend() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage.preferences.set_int(keys::STREAK, 2).await.unwrap();
        assert_eq!(other.preferences.get_int(keys::STREAK).await.unwrap(), Some(2));
    }
}
