//! Remote dataset fetcher.
//!
//! Datasets are plain JSON documents published under a fixed origin:
//! `db.json` (routes), `stops.json` (stop names) and `stop-routes.json`
//! (stop name → route ids).

mod client;
mod error;
pub mod mock;

use std::future::Future;

use serde::de::DeserializeOwned;

pub use client::{DEFAULT_BASE_URL, HttpSource, RemoteConfig};
pub use error::FetchError;
pub use mock::StaticSource;

/// Source of authoritative dataset payloads.
pub trait DatasetSource: Clone + Send + Sync + 'static {
    /// Fetch and decode the document at `path`.
    fn fetch<V>(&self, path: &str) -> impl Future<Output = Result<V, FetchError>> + Send
    where
        V: DeserializeOwned + Send;
}
