//! Fuzzy index over transit records.
//!
//! The index precomputes lowercased field values for a record list and a
//! fixed set of keys, then scores queries with a windowed edit distance
//! (see the `matcher` module). Rebuilding is the only way to change either the
//! records or the keys.

mod config;
mod fuzzy;
mod matcher;
mod searchable;

pub use config::MatchConfig;
pub use fuzzy::{FuzzyIndex, Match};
pub use searchable::{RouteKey, RouteSelection, Searchable, StopKey, StopSelection};
