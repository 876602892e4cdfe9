//! Transit records served by the search workers.
//!
//! Routes carry their full stop list; stops are plain names joined with
//! the stop → routes map at load time.

mod route;
mod stop;

pub use route::{Route, RouteSummary};
pub use stop::{StopRecord, StopRoutes, join_stops};
