//! Fuzzy search workers for bus routes and stops.
//!
//! Each worker loads its datasets through a stale-while-revalidate cache,
//! builds a typo-tolerant index over them, and answers paginated search and
//! lookup requests sent as JSON messages.

pub mod config;
pub mod domain;
pub mod engine;
pub mod index;
pub mod loader;
pub mod protocol;
pub mod remote;
pub mod store;
pub mod worker;
