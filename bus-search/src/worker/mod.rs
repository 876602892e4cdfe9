//! Search workers.
//!
//! A worker is a tokio task that exclusively owns one query engine. The
//! host talks to it only through channels of JSON text, so route and stop
//! workers are independent and never share mutable state.

mod corpus;
mod handle;

pub use corpus::{Corpus, Routes, Stops};
pub use handle::{WorkerError, WorkerHandle, spawn};
