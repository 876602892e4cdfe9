//! Query engine.
//!
//! Owns the fuzzy index for one worker, serves paginated searches, and
//! remembers the most recent query's match list so paging through the
//! same query never re-runs the matcher.

mod page;
mod query;

pub use page::{Page, PageError, PageRequest};
pub use query::{EngineStats, QueryEngine};
