//! Stop records and the stop → routes mapping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mapping from stop name to the ids of the routes serving it.
///
/// Loaded alongside the stop list but never fuzzy-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopRoutes(HashMap<String, Vec<String>>);

impl StopRoutes {
    /// Route ids serving a stop; empty if the stop is unknown.
    pub fn routes_for(&self, stop: &str) -> &[String] {
        self.0.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for StopRoutes {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A stop joined with the routes that serve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecord {
    /// Stop name; doubles as the identifier
    pub name: String,

    /// Route ids serving this stop
    pub routes: Vec<String>,
}

/// Join the stop list with the stop → routes map.
///
/// Stops missing from the map get an empty route list. Order follows the
/// stop list.
pub fn join_stops(stops: Vec<String>, stop_routes: &StopRoutes) -> Vec<StopRecord> {
    stops
        .into_iter()
        .map(|name| {
            let routes = stop_routes.routes_for(&name).to_vec();
            StopRecord { name, routes }
        })
        .collect()
}
