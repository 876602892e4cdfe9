//! In-memory dataset source for testing without network access.
//!
//! Serves canned JSON payloads by path. Fetches can be made to fail, and a
//! gate can hold every fetch pending until released, which lets tests
//! observe what happens while a refresh is still in flight.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use super::DatasetSource;
use super::error::FetchError;

#[derive(Debug, Default)]
struct Payloads {
    bodies: HashMap<String, serde_json::Value>,
    failing: HashSet<String>,
}

/// Dataset source that serves pre-loaded JSON.
#[derive(Debug, Clone)]
pub struct StaticSource {
    payloads: Arc<Mutex<Payloads>>,
    fetches: Arc<AtomicUsize>,
    gate: Arc<watch::Sender<bool>>,
}

impl StaticSource {
    /// Create an empty source. Every path is not-found until inserted.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            payloads: Arc::default(),
            fetches: Arc::default(),
            gate: Arc::new(gate),
        }
    }

    /// Serve `value` at `path`.
    pub fn with<V: Serialize>(self, path: &str, value: &V) -> Self {
        self.insert(path, value);
        self
    }

    /// Serve `value` at `path`, replacing any previous payload.
    pub fn insert<V: Serialize>(&self, path: &str, value: &V) {
        let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        let mut payloads = self.lock();
        payloads.failing.remove(path);
        payloads.bodies.insert(path.to_string(), json);
    }

    /// Make fetches of `path` fail with a server error.
    pub fn fail(&self, path: &str) {
        self.lock().failing.insert(path.to_string());
    }

    /// Hold every fetch pending until [`StaticSource::release`] is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held fetches complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Payloads> {
        // A panic while holding the lock cannot leave payloads half-updated.
        self.payloads.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetSource for StaticSource {
    async fn fetch<V>(&self, path: &str) -> Result<V, FetchError>
    where
        V: DeserializeOwned + Send,
    {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.gate.subscribe();
        // The sender lives in `self`, so this cannot fail while we hold it.
        let _ = gate.wait_for(|open| *open).await;

        let body = {
            let payloads = self.lock();
            if payloads.failing.contains(path) {
                return Err(FetchError::Api {
                    status: 503,
                    message: format!("{path} unavailable"),
                });
            }
            payloads.bodies.get(path).cloned()
        };

        let body = body.ok_or_else(|| FetchError::NotFound {
            path: path.to_string(),
        })?;

        serde_json::from_value(body).map_err(|e| FetchError::Json {
            message: e.to_string(),
        })
    }
}
