//! Persistent key-value storage for login credentials
//!
//! Uses JSON file storage in ~/.config/classpair/credentials.json

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Key under which the authorized teacher's class is stored
pub const KEY_SELECTED_CLASS: &str = "selectedClass";
/// Key under which the authorized teacher's display name is stored
pub const KEY_TEACHER: &str = "teacher";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration directory not found")]
    NoConfigDir,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Stored data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredData {
    /// String values indexed by key
    values: HashMap<String, String>,
}

/// Key-value store with file persistence
pub struct CredentialStore {
    /// Path to the storage file
    path: PathBuf,
    /// In-memory cache of values
    data: Arc<RwLock<StoredData>>,
}

impl CredentialStore {
    /// Create a new store at the default location
    ///
    /// Loads existing data from disk if present.
    pub fn open() -> StoreResult<Self> {
        let path = Self::default_path()?;
        Self::with_path(path)
    }

    /// Create a store at a specific path
    pub fn with_path(path: PathBuf) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Load existing data or create empty
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(data) => {
                    info!("Loaded credential store from {:?}", path);
                    data
                }
                Err(e) => {
                    warn!("Failed to parse credential store, starting fresh: {}", e);
                    StoredData::default()
                }
            }
        } else {
            debug!("No existing credential store, creating new");
            StoredData::default()
        };

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Get the default storage path (~/.config/classpair/credentials.json)
    fn default_path() -> StoreResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(config_dir.join("classpair").join("credentials.json"))
    }

    /// Save current state to disk
    async fn save(&self) -> StoreResult<()> {
        let data = self.data.read().await;
        let json = serde_json::to_string_pretty(&*data)?;
        std::fs::write(&self.path, json)?;
        debug!("Saved credential store to {:?}", self.path);
        Ok(())
    }

    /// Set a value and persist it
    pub async fn set(&self, key: &str, value: impl Into<String>) -> StoreResult<()> {
        {
            let mut data = self.data.write().await;
            data.values.insert(key.to_string(), value.into());
        }
        self.save().await
    }

    /// Get a value by key
    pub async fn get(&self, key: &str) -> Option<String> {
        let data = self.data.read().await;
        data.values.get(key).cloned()
    }

    /// Remove a value by key; a no-op if the key is absent
    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        let removed = {
            let mut data = self.data.write().await;
            data.values.remove(key).is_some()
        };
        if removed {
            self.save().await?;
        }
        Ok(())
    }

    /// Number of stored values
    pub async fn len(&self) -> usize {
        let data = self.data.read().await;
        data.values.len()
    }

    /// Check whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clear all stored values
    pub async fn clear(&self) -> StoreResult<()> {
        {
            let mut data = self.data.write().await;
            data.values.clear();
        }
        self.save().await?;
        info!("Cleared credential store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_store_crud() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_credentials.json");

        let store = CredentialStore::with_path(path).unwrap();

        store.set(KEY_SELECTED_CLASS, "8B").await.unwrap();
        store.set(KEY_TEACHER, "Asha Rao").await.unwrap();

        assert_eq!(store.get(KEY_SELECTED_CLASS).await.unwrap(), "8B");
        assert_eq!(store.get(KEY_TEACHER).await.unwrap(), "Asha Rao");
        assert_eq!(store.len().await, 2);

        store.remove(KEY_TEACHER).await.unwrap();
        assert!(store.get(KEY_TEACHER).await.is_none());

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_credentials.json");

        {
            let store = CredentialStore::with_path(path.clone()).unwrap();
            store.set(KEY_SELECTED_CLASS, "9A").await.unwrap();
        }

        // Reload from disk
        let store = CredentialStore::with_path(path).unwrap();
        assert_eq!(store.get(KEY_SELECTED_CLASS).await.unwrap(), "9A");
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_credentials.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CredentialStore::with_path(path).unwrap();
        assert!(store.is_empty().await);
        store.set(KEY_TEACHER, "recovered").await.unwrap();
        assert_eq!(store.get(KEY_TEACHER).await.unwrap(), "recovered");
    }
}
