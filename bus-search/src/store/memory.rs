//! In-memory key-value cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::{Cached, KeyValueStore, validate_key};

/// Key-value cache that lives only as long as the process.
///
/// Values are held as decoded JSON, so reads go through the same
/// deserialization path as the disk store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, (DateTime<Utc>, serde_json::Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get<V>(&self, key: &str) -> Result<Option<Cached<V>>, StoreError>
    where
        V: DeserializeOwned + Send,
    {
        validate_key(key)?;

        let raw = {
            let guard = self.entries.read().await;
            guard.get(key).cloned()
        };

        raw.map(|(cached_at, json)| {
            serde_json::from_value(json)
                .map(|value| Cached { value, cached_at })
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                })
        })
        .transpose()
    }

    async fn set<V>(&self, key: &str, value: &V) -> Result<(), StoreError>
    where
        V: Serialize + Sync,
    {
        validate_key(key)?;

        let json = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        let mut guard = self.entries.write().await;
        guard.insert(key.to_string(), (Utc::now(), json));
        Ok(())
    }
}
