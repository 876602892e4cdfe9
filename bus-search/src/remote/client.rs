//! HTTP dataset client.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::DatasetSource;
use super::error::FetchError;

/// Default origin the datasets are published under.
pub const DEFAULT_BASE_URL: &str = "https://golden-beijinho-3bd2e6.netlify.app";

/// Configuration for the HTTP dataset client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Origin the dataset paths are resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Fetches datasets as JSON over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a new client.
    pub fn new(config: RemoteConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl DatasetSource for HttpSource {
    async fn fetch<V>(&self, path: &str) -> Result<V, FetchError>
    where
        V: DeserializeOwned + Send,
    {
        let url = self.url(path);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
        })
    }
}
