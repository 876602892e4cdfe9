//! Records the fuzzy index knows how to match.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Route, RouteSummary, StopRecord};

/// A record type that can be fuzzy-indexed.
///
/// `Key` names a matchable field; `Selection` is the externally visible
/// choice of which keys are active.
pub trait Searchable: Send + Sync + 'static {
    /// A single matchable field.
    type Key: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// Field selection accepted from the host.
    type Selection: Copy
        + Eq
        + Default
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Projection returned in paged results.
    type Summary: Serialize + Clone + fmt::Debug + PartialEq + Send + 'static;

    /// Identifier used by lookups.
    fn id(&self) -> &str;

    /// Keys searched for a selection.
    fn keys(selection: Self::Selection) -> &'static [Self::Key];

    /// Text values of one field. List fields yield one value per element.
    fn values(&self, key: Self::Key) -> Vec<&str>;

    /// Light-weight projection for paged results.
    fn summary(&self) -> Self::Summary;
}

/// Matchable route fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKey {
    Name,
    Stops,
}

/// Which route fields a search matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSelection {
    RouteName,
    RouteStops,
    #[default]
    Both,
}

impl Searchable for Route {
    type Key = RouteKey;
    type Selection = RouteSelection;
    type Summary = RouteSummary;

    fn id(&self) -> &str {
        &self.id
    }

    fn keys(selection: RouteSelection) -> &'static [RouteKey] {
        match selection {
            RouteSelection::RouteName => &[RouteKey::Name],
            RouteSelection::RouteStops => &[RouteKey::Stops],
            RouteSelection::Both => &[RouteKey::Name, RouteKey::Stops],
        }
    }

    fn values(&self, key: RouteKey) -> Vec<&str> {
        match key {
            RouteKey::Name => vec![self.route_name.as_str()],
            RouteKey::Stops => self.route_stops.iter().map(String::as_str).collect(),
        }
    }

    fn summary(&self) -> RouteSummary {
        Route::summary(self)
    }
}

/// Stops only ever match on their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKey {
    Name,
}

/// Field selection for stops. There is only one choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSelection {
    #[default]
    Name,
}

impl Searchable for StopRecord {
    type Key = StopKey;
    type Selection = StopSelection;
    type Summary = String;

    fn id(&self) -> &str {
        &self.name
    }

    fn keys(_selection: StopSelection) -> &'static [StopKey] {
        &[StopKey::Name]
    }

    fn values(&self, key: StopKey) -> Vec<&str> {
        match key {
            StopKey::Name => vec![self.name.as_str()],
        }
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}
