//! The record collections a worker can serve.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Route, StopRecord, join_stops};
use crate::index::Searchable;
use crate::loader::{Loader, RoutesDataset, Settled, StopRoutesDataset, StopsDataset};
use crate::remote::DatasetSource;
use crate::store::KeyValueStore;

/// A searchable collection and how to load it.
pub trait Corpus: Send + 'static {
    /// Record type served by searches and lookups.
    type Record: Searchable + Clone + Serialize + DeserializeOwned;

    /// Worker kind, recorded on the worker's span.
    const KIND: &'static str;

    /// Load the current generation, with any background refresh attached.
    fn load<S, F>(
        loader: &Loader<S, F>,
    ) -> impl Future<Output = Settled<Vec<Self::Record>>> + Send
    where
        S: KeyValueStore,
        F: DatasetSource;
}

/// Bus routes, searched by name and stop names.
#[derive(Debug)]
pub struct Routes;

impl Corpus for Routes {
    type Record = Route;

    const KIND: &'static str = "routes";

    async fn load<S, F>(loader: &Loader<S, F>) -> Settled<Vec<Route>>
    where
        S: KeyValueStore,
        F: DatasetSource,
    {
        loader.load::<RoutesDataset>().await
    }
}

/// Bus stops, searched by name; lookups carry the serving routes.
#[derive(Debug)]
pub struct Stops;

impl Corpus for Stops {
    type Record = StopRecord;

    const KIND: &'static str = "stops";

    async fn load<S, F>(loader: &Loader<S, F>) -> Settled<Vec<StopRecord>>
    where
        S: KeyValueStore,
        F: DatasetSource,
    {
        let (stops, stop_routes) = futures::future::join(
            loader.load::<StopsDataset>(),
            loader.load::<StopRoutesDataset>(),
        )
        .await;

        stops
            .zip(stop_routes)
            .map(|(stops, stop_routes)| join_stops(stops, &stop_routes))
    }
}
