//! Durable key-value storage behind the review/favorite store

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract key-value storage provider.
///
/// Values are whole documents: every `write` replaces the previous value for
/// the key in full.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the value stored under `key`
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Replace the value stored under `key`
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Remove the value stored under `key`
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a value exists for `key`
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Keys map to file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> StorageResult<()> {
    if !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Local filesystem storage provider, one JSON file per key
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        // Write to a sibling temp file then rename so readers never see a torn value
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_path(key)?;
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::BackendError("memory storage lock poisoned".to_string())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.data
            .read()
            .map_err(|_| Self::poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        self.data
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.data
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self
            .data
            .read()
            .map_err(|_| Self::poisoned())?
            .contains_key(key))
    }
}
