//! Persistent cache error types.

use std::path::PathBuf;

/// Errors from the persistent key-value cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key contains characters that cannot name a cache entry
    #[error("invalid cache key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Reading or writing the backing file failed
    #[error("cache I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored entry could not be decoded
    #[error("corrupt cache entry {key:?}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded for storage
    #[error("failed to encode cache entry {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
