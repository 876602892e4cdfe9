//! Stale-while-revalidate dataset loading.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::remote::DatasetSource;
use crate::store::KeyValueStore;

use super::dataset::Dataset;
use super::settled::{Provenance, Refresh, Refreshed, Settled};

/// Loads datasets from the persistent cache, falling back to (and
/// refreshing from) the remote source.
#[derive(Debug, Clone)]
pub struct Loader<S, F> {
    store: S,
    source: F,
}

impl<S: KeyValueStore, F: DatasetSource> Loader<S, F> {
    pub fn new(store: S, source: F) -> Self {
        Self { store, source }
    }

    /// The persistent cache this loader writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load one dataset.
    ///
    /// A non-empty cached value is returned immediately with the remote
    /// fetch left running in the background; the fetched value is written
    /// back to the cache when it arrives. Without a usable cached value the
    /// fetch is awaited. Failures are logged and never returned: the worst
    /// case is an empty value marked [`Provenance::Unavailable`].
    pub async fn load<D: Dataset>(&self) -> Settled<D::Value> {
        let cached = match self.store.get::<D::Value>(D::CACHE_KEY).await {
            Ok(Some(entry)) if !D::is_empty(&entry.value) => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!(dataset = D::NAME, error = %e, "cache read failed, treating as empty");
                None
            }
        };

        if let Some(entry) = cached {
            let age = Utc::now().signed_duration_since(entry.cached_at);
            info!(
                dataset = D::NAME,
                age_secs = age.num_seconds(),
                "using cached dataset, refreshing in background"
            );

            let (store, source) = (self.store.clone(), self.source.clone());
            let refresh = Refresh::spawn(async move {
                fetch_and_persist::<D, _, _>(store, source)
                    .await
                    .map(Refreshed::fresh)
            });

            return Settled {
                value: entry.value,
                provenance: Provenance::Cached,
                refresh: Some(refresh),
            };
        }

        debug!(dataset = D::NAME, "no cached dataset, waiting for fetch");

        match fetch_and_persist::<D, _, _>(self.store.clone(), self.source.clone()).await {
            Some(value) => Settled::ready(value, Provenance::Fresh),
            None => Settled::ready(D::Value::default(), Provenance::Unavailable),
        }
    }
}

/// Fetch a dataset and write it to the cache.
///
/// Returns the fetched value even if persisting it failed.
async fn fetch_and_persist<D, S, F>(store: S, source: F) -> Option<D::Value>
where
    D: Dataset,
    S: KeyValueStore,
    F: DatasetSource,
{
    debug!(dataset = D::NAME, path = D::PATH, "fetching dataset");

    let value: D::Value = match source.fetch(D::PATH).await {
        Ok(value) => value,
        Err(e) => {
            warn!(dataset = D::NAME, error = %e, "fetching dataset failed");
            return None;
        }
    };

    if let Err(e) = store.set(D::CACHE_KEY, &value).await {
        warn!(dataset = D::NAME, error = %e, "persisting dataset failed");
    }

    info!(dataset = D::NAME, "fetched dataset");
    Some(value)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{Route, StopRoutes};
    use crate::loader::{RoutesDataset, StopRoutesDataset, StopsDataset};
    use crate::remote::StaticSource;
    use crate::store::{DiskStore, MemoryStore};

    fn stops(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn cached_stops(store: &MemoryStore) -> Option<Vec<String>> {
        store
            .get::<Vec<String>>(StopsDataset::CACHE_KEY)
            .await
            .unwrap()
            .map(|c| c.value)
    }

    #[tokio::test]
    async fn cold_cache_awaits_fetch_and_persists() {
        let store = MemoryStore::new();
        let source = StaticSource::new().with("stops.json", &stops(&["Majestic", "Hebbal"]));
        let loader = Loader::new(store.clone(), source.clone());

        let settled = loader.load::<StopsDataset>().await;

        assert_eq!(settled.value, stops(&["Majestic", "Hebbal"]));
        assert_eq!(settled.provenance, Provenance::Fresh);
        assert!(settled.refresh.is_none());
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(
            cached_stops(&store).await,
            Some(stops(&["Majestic", "Hebbal"]))
        );
    }

    #[tokio::test]
    async fn warm_cache_returns_without_waiting_for_network() {
        let store = MemoryStore::new();
        store
            .set(StopsDataset::CACHE_KEY, &stops(&["Old Stop"]))
            .await
            .unwrap();

        let source = StaticSource::new().with("stops.json", &stops(&["New Stop"]));
        source.hold();
        let loader = Loader::new(store.clone(), source.clone());

        let settled = tokio::time::timeout(Duration::from_secs(5), loader.load::<StopsDataset>())
            .await
            .expect("cached load must not wait for the network");

        assert_eq!(settled.value, stops(&["Old Stop"]));
        assert_eq!(settled.provenance, Provenance::Cached);
        assert_eq!(cached_stops(&store).await, Some(stops(&["Old Stop"])));

        source.release();
        let refreshed = settled.refresh.unwrap().wait().await;
        assert_eq!(refreshed, Some(Refreshed::fresh(stops(&["New Stop"]))));
        assert_eq!(cached_stops(&store).await, Some(stops(&["New Stop"])));
    }

    #[tokio::test]
    async fn cold_cache_fetch_failure_is_unavailable() {
        let store = MemoryStore::new();
        let loader = Loader::new(store.clone(), StaticSource::new());

        let settled = loader.load::<RoutesDataset>().await;

        assert!(settled.value.is_empty());
        assert_eq!(settled.provenance, Provenance::Unavailable);
        assert!(settled.refresh.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn background_failure_keeps_cached_value() {
        let store = MemoryStore::new();
        let routes = vec![Route::new("A", "Majestic Express")];
        store
            .set(RoutesDataset::CACHE_KEY, &routes)
            .await
            .unwrap();

        let source = StaticSource::new();
        source.fail("db.json");
        let loader = Loader::new(store.clone(), source);

        let settled = loader.load::<RoutesDataset>().await;
        assert_eq!(settled.value, routes);
        assert_eq!(settled.refresh.unwrap().wait().await, None);

        let still_cached = store
            .get::<Vec<Route>>(RoutesDataset::CACHE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still_cached.value, routes);
    }

    #[tokio::test]
    async fn empty_cached_value_is_treated_as_missing() {
        let store = MemoryStore::new();
        store
            .set(StopRoutesDataset::CACHE_KEY, &StopRoutes::default())
            .await
            .unwrap();

        let map: StopRoutes = [("Majestic".to_string(), vec!["500D".to_string()])]
            .into_iter()
            .collect();
        let source = StaticSource::new().with("stop-routes.json", &map);
        let loader = Loader::new(store, source);

        let settled = loader.load::<StopRoutesDataset>().await;
        assert_eq!(settled.provenance, Provenance::Fresh);
        assert_eq!(settled.value, map);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("__bus_find_stops__.json"), "garbage").unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();

        let source = StaticSource::new().with("stops.json", &stops(&["Majestic"]));
        let loader = Loader::new(store.clone(), source);

        let settled = loader.load::<StopsDataset>().await;
        assert_eq!(settled.provenance, Provenance::Fresh);
        assert_eq!(settled.value, stops(&["Majestic"]));

        let repaired = store
            .get::<Vec<String>>(StopsDataset::CACHE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(repaired.value, stops(&["Majestic"]));
    }

    #[tokio::test]
    async fn concurrent_datasets_settle_independently() {
        let store = MemoryStore::new();
        store
            .set(StopsDataset::CACHE_KEY, &stops(&["Cached Stop"]))
            .await
            .unwrap();

        let map: StopRoutes = [("Cached Stop".to_string(), vec!["1".to_string()])]
            .into_iter()
            .collect();
        let source = StaticSource::new()
            .with("stops.json", &stops(&["Fresh Stop"]))
            .with("stop-routes.json", &map);
        let loader = Loader::new(store, source);

        let (stops_settled, map_settled) = futures::future::join(
            loader.load::<StopsDataset>(),
            loader.load::<StopRoutesDataset>(),
        )
        .await;

        assert_eq!(stops_settled.provenance, Provenance::Cached);
        assert_eq!(map_settled.provenance, Provenance::Fresh);
        assert_eq!(map_settled.value, map);
    }
}
