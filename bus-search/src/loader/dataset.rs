//! Named datasets and where they live.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Route, StopRoutes};

/// A logical dataset: its cache key, its remote path and its value type.
pub trait Dataset: Send + Sync + 'static {
    type Value: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    /// Persistent cache key.
    const CACHE_KEY: &'static str;

    /// Path relative to the remote origin.
    const PATH: &'static str;

    /// Whether a value holds no usable data. Empty cached values are
    /// treated as missing.
    fn is_empty(value: &Self::Value) -> bool;
}

/// All routes with their stop lists.
pub struct RoutesDataset;

impl Dataset for RoutesDataset {
    type Value = Vec<Route>;
    const NAME: &'static str = "routes";
    const CACHE_KEY: &'static str = "__bus_find_routes__";
    const PATH: &'static str = "db.json";

    fn is_empty(value: &Vec<Route>) -> bool {
        value.is_empty()
    }
}

/// All stop names.
pub struct StopsDataset;

impl Dataset for StopsDataset {
    type Value = Vec<String>;
    const NAME: &'static str = "stops";
    const CACHE_KEY: &'static str = "__bus_find_stops__";
    const PATH: &'static str = "stops.json";

    fn is_empty(value: &Vec<String>) -> bool {
        value.is_empty()
    }
}

/// Stop name → serving route ids.
pub struct StopRoutesDataset;

impl Dataset for StopRoutesDataset {
    type Value = StopRoutes;
    const NAME: &'static str = "stop-routes";
    const CACHE_KEY: &'static str = "__bus_find_stop-routes__";
    const PATH: &'static str = "stop-routes.json";

    fn is_empty(value: &StopRoutes) -> bool {
        value.is_empty()
    }
}
