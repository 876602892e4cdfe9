//! Remote dataset fetch error types.

/// Errors from fetching a dataset over the network.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No dataset is published at this path
    #[error("dataset not found: {path}")]
    NotFound { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = FetchError::Json {
            message: "expected an array".into(),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected an array");

        let err = FetchError::NotFound {
            path: "stops.json".into(),
        };
        assert_eq!(err.to_string(), "dataset not found: stops.json");
    }
}
