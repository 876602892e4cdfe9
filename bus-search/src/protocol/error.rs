//! Request validation errors.

use serde::{Deserialize, Serialize};

use crate::engine::PageError;

/// Why a request was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Not valid JSON, unknown operation, or missing/mistyped fields
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Page cursor out of range
    #[error("invalid request: {0}")]
    InvalidPage(#[from] PageError),

    /// Page size above the configured maximum
    #[error("invalid request: page size {size} exceeds maximum {max}")]
    PageSizeTooLarge { size: u32, max: u32 },

    /// Lookup without an identifier
    #[error("invalid request: id must not be empty")]
    EmptyId,
}

/// Error category reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The payload could not be decoded
    Malformed,
    /// The payload decoded but a field is out of range
    Invalid,
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Malformed(_) => ErrorKind::Malformed,
            RequestError::InvalidPage(_)
            | RequestError::PageSizeTooLarge { .. }
            | RequestError::EmptyId => ErrorKind::Invalid,
        }
    }
}
