//! Settled datasets and their pending background refreshes.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{Instrument, warn};

/// Where the active data came from.
///
/// Ordered from best to worst so combining datasets can take the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Fetched from the remote origin during this lifecycle.
    Fresh,
    /// Read from the persistent cache; may be out of date.
    Cached,
    /// Nothing cached and the fetch failed; the data is empty.
    Unavailable,
}

impl Provenance {
    /// The worse of two provenances.
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }
}

/// The outcome of a refresh that produced something.
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed<T> {
    pub value: T,

    /// `Fresh` if all of `value` was refetched; otherwise the worst
    /// provenance among the parts that were not.
    pub provenance: Provenance,
}

impl<T> Refreshed<T> {
    /// A value fetched from the remote origin.
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Fresh,
        }
    }
}

/// A background refresh that resolves to the new value, or `None` if the
/// fetch failed.
#[derive(Debug)]
pub struct Refresh<T>(JoinHandle<Option<Refreshed<T>>>);

impl<T: Send + 'static> Refresh<T> {
    /// Run `fut` on the runtime, carrying the current tracing span.
    pub(crate) fn spawn<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Option<Refreshed<T>>> + Send + 'static,
    {
        Self(tokio::spawn(fut.in_current_span()))
    }

    /// Wait for the refresh to finish.
    pub async fn wait(self) -> Option<Refreshed<T>> {
        match self.0.await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "background refresh task failed");
                None
            }
        }
    }

    /// Whether the refresh has finished (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

/// A dataset that is ready to use.
#[derive(Debug)]
pub struct Settled<T> {
    /// The value to build from now.
    pub value: T,

    /// Where `value` came from.
    pub provenance: Provenance,

    /// Background refresh still running, if the value came from the cache.
    pub refresh: Option<Refresh<T>>,
}

impl<T: Clone + Send + 'static> Settled<T> {
    /// A settled value with no refresh pending.
    pub fn ready(value: T, provenance: Provenance) -> Self {
        Self {
            value,
            provenance,
            refresh: None,
        }
    }

    /// Combine two datasets that are used together.
    ///
    /// The combined refresh resolves once both halves have; a half whose
    /// refresh failed (or never ran) keeps its current value and
    /// provenance. It resolves to `None` only if neither half produced a new
    /// value.
    pub fn zip<U: Clone + Send + 'static>(self, other: Settled<U>) -> Settled<(T, U)> {
        let provenance = self.provenance.combine(other.provenance);

        let refresh = match (self.refresh, other.refresh) {
            (None, None) => None,
            (left, right) => {
                let current_left = Refreshed {
                    value: self.value.clone(),
                    provenance: self.provenance,
                };
                let current_right = Refreshed {
                    value: other.value.clone(),
                    provenance: other.provenance,
                };
                Some(Refresh::spawn(async move {
                    let new_left = match left {
                        Some(r) => r.wait().await,
                        None => None,
                    };
                    let new_right = match right {
                        Some(r) => r.wait().await,
                        None => None,
                    };
                    if new_left.is_none() && new_right.is_none() {
                        return None;
                    }
                    let left = new_left.unwrap_or(current_left);
                    let right = new_right.unwrap_or(current_right);
                    Some(Refreshed {
                        value: (left.value, right.value),
                        provenance: left.provenance.combine(right.provenance),
                    })
                }))
            }
        };

        Settled {
            value: (self.value, other.value),
            provenance,
            refresh,
        }
    }

    /// Transform the value and any pending refresh.
    pub fn map<U, F>(self, f: F) -> Settled<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Clone + Send + 'static,
    {
        let refresh = self.refresh.map(|r| {
            let f = f.clone();
            Refresh::spawn(async move {
                r.wait().await.map(|refreshed| Refreshed {
                    value: f(refreshed.value),
                    provenance: refreshed.provenance,
                })
            })
        });

        Settled {
            value: f(self.value),
            provenance: self.provenance,
            refresh,
        }
    }
}
