//! Dataset loading.
//!
//! Each worker loads one or more named datasets through a [`Loader`]:
//! cached data is used straight away and refreshed in the background,
//! missing data is fetched before the worker reports ready.

mod dataset;
mod load;
mod settled;

pub use dataset::{Dataset, RoutesDataset, StopRoutesDataset, StopsDataset};
pub use load::Loader;
pub use settled::{Provenance, Refresh, Refreshed, Settled};
