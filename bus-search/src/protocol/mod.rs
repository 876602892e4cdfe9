//! Message protocol between a host and a search worker.
//!
//! Requests are JSON objects tagged by `op`; replies are JSON objects
//! tagged by `type`. Every request gets exactly one reply, in order.

mod error;
mod handler;
mod request;
mod response;

pub use error::{ErrorKind, RequestError};
pub use handler::{Handler, Reply};
pub use request::{Command, LookupArgs, OptionArgs, Request, SearchArgs};
pub use response::{ErrorResponse, RecordResponse, SearchResponse, WorkerMessage};
