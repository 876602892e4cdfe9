//! Disk-backed key-value cache.
//!
//! Each key is a JSON file `<key>.json` in one directory, holding the value
//! and the time it was written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::{Cached, KeyValueStore, validate_key};

/// On-disk entry layout.
#[derive(Debug, Serialize, Deserialize)]
struct Entry<V> {
    cached_at: DateTime<Utc>,
    value: V,
}

/// Key-value cache stored as one JSON file per key.
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    /// Directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for DiskStore {
    async fn get<V>(&self, key: &str) -> Result<Option<Cached<V>>, StoreError>
    where
        V: DeserializeOwned + Send,
    {
        let path = self.path_for(key)?;

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let entry: Entry<V> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })?;

        Ok(Some(Cached {
            value: entry.value,
            cached_at: entry.cached_at,
        }))
    }

    async fn set<V>(&self, key: &str, value: &V) -> Result<(), StoreError>
    where
        V: Serialize + Sync,
    {
        let path = self.path_for(key)?;

        let json = serde_json::to_vec(&Entry {
            cached_at: Utc::now(),
            value,
        })
        .map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        // Write then rename so readers never see a half-written entry.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path, source })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();

        let stops = vec!["Majestic".to_string(), "Hebbal".to_string()];
        store.set("__bus_find_stops__", &stops).await.unwrap();

        let loaded: Cached<Vec<String>> = store.get("__bus_find_stops__").await.unwrap().unwrap();
        assert_eq!(loaded.value, stops);
        assert!(loaded.cached_at <= Utc::now());
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();

        let loaded: Option<Cached<Vec<String>>> = store.get("__bus_find_routes__").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();

        store.set("k", &vec![1, 2, 3]).await.unwrap();
        store.set("k", &vec![4]).await.unwrap();

        let loaded: Cached<Vec<i32>> = store.get("k").await.unwrap().unwrap();
        assert_eq!(loaded.value, vec![4]);
        assert!(!dir.path().join("k.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("k.json"), "{not json").unwrap();

        let result = store.get::<Vec<String>>("k").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();

        let result = store.set("../escape", &1).await;
        assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
    }

    #[tokio::test]
    async fn open_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("cache");
        let store = DiskStore::open(&nested).await.unwrap();

        store.set("k", &true).await.unwrap();
        assert!(nested.join("k.json").exists());
        assert_eq!(store.dir(), nested.as_path());
    }
}
