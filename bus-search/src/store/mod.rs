//! Persistent key-value cache for datasets.
//!
//! The cache is an explicitly constructed value handed to the loader; there
//! is no process-wide instance. Keys are fixed identifiers, one per dataset
//! kind, and values are the decoded JSON payloads.

mod disk;
mod error;
mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use disk::DiskStore;
pub use error::StoreError;
pub use memory::MemoryStore;

/// A cached value and when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<V> {
    pub value: V,
    pub cached_at: DateTime<Utc>,
}

/// Asynchronous, durable string-keyed storage.
///
/// Implementations are cheap to clone; clones share the same entries.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    /// Read a value. Returns `None` if the key has never been written.
    fn get<V>(&self, key: &str) -> impl Future<Output = Result<Option<Cached<V>>, StoreError>> + Send
    where
        V: DeserializeOwned + Send;

    /// Write a value, replacing any previous one.
    fn set<V>(&self, key: &str, value: &V) -> impl Future<Output = Result<(), StoreError>> + Send
    where
        V: Serialize + Sync;
}

/// Keys name files on disk, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "must not be empty",
        });
    }

    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "only ASCII letters, digits, '_' and '-' are allowed",
        });
    }

    Ok(())
}
