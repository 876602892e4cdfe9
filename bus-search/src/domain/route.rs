//! Route records.

use serde::{Deserialize, Serialize};

/// A bus route as published in the routes dataset.
///
/// Records are immutable once loaded; a refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier
    pub id: String,

    /// Display name (e.g., "Majestic Express")
    pub route_name: String,

    /// Stop names in travel order
    #[serde(default)]
    pub route_stops: Vec<String>,

    /// Optional external map link
    #[serde(default)]
    pub map_link: Option<String>,
}

impl Route {
    /// Create a route with no stops and no map link.
    pub fn new(id: impl Into<String>, route_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route_name: route_name.into(),
            route_stops: Vec::new(),
            map_link: None,
        }
    }

    /// Set the stop list.
    pub fn with_stops<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_stops = stops.into_iter().map(Into::into).collect();
        self
    }

    /// Set the map link.
    pub fn with_map_link(mut self, link: impl Into<String>) -> Self {
        self.map_link = Some(link.into());
        self
    }

    /// Project to the light-weight form used in paged results.
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            id: self.id.clone(),
            route_name: self.route_name.clone(),
            map_link: self.map_link.clone(),
        }
    }
}

/// A route without its stop list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: String,
    pub route_name: String,
    pub map_link: Option<String>,
}
