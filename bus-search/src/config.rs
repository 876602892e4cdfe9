//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::index::MatchConfig;
use crate::remote::RemoteConfig;

/// Default directory for the persistent cache.
pub const DEFAULT_CACHE_DIR: &str = "bus_search_cache";

/// How long shutdown waits for an in-flight refresh.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// What a worker does with a background refresh once it completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Write the new generation to the cache for the next start only.
    #[default]
    PersistOnly,

    /// Also rebuild from the new generation between requests.
    Adopt,
}

impl FromStr for RefreshPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persist" | "persist_only" => Ok(RefreshPolicy::PersistOnly),
            "adopt" => Ok(RefreshPolicy::Adopt),
            _ => Err(ConfigError::Invalid {
                var: REFRESH_VAR,
                value: s.to_string(),
                reason: "expected `persist` or `adopt`".to_string(),
            }),
        }
    }
}

/// An environment variable held a value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

const BASE_URL_VAR: &str = "BUS_SEARCH_BASE_URL";
const CACHE_DIR_VAR: &str = "BUS_SEARCH_CACHE_DIR";
const TIMEOUT_VAR: &str = "BUS_SEARCH_TIMEOUT_SECS";
const REFRESH_VAR: &str = "BUS_SEARCH_REFRESH";
const MAX_PAGE_SIZE_VAR: &str = "BUS_SEARCH_MAX_PAGE_SIZE";

/// Everything a worker and its host need to start.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Remote origin and transport timeout
    pub remote: RemoteConfig,

    /// Directory holding the persistent cache
    pub cache_dir: PathBuf,

    /// Fuzzy matching parameters
    pub matching: MatchConfig,

    /// Largest accepted `pageSize`; uncapped when `None`
    pub max_page_size: Option<u32>,

    /// Whether completed refreshes are adopted
    pub refresh_policy: RefreshPolicy,

    /// Capacity of the request and reply channels
    pub channel_capacity: usize,

    /// How long shutdown waits for an in-flight refresh
    pub shutdown_grace: Duration,
}

impl WorkerConfig {
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    /// Reject requests whose `pageSize` exceeds `max`.
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = Some(max);
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Read overrides from `BUS_SEARCH_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparseable ones are an
    /// error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`WorkerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_VAR) {
            config.remote = config.remote.with_base_url(url);
        }
        if let Some(dir) = lookup(CACHE_DIR_VAR) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let secs = parse_positive(TIMEOUT_VAR, &secs)?;
            config.remote = config.remote.with_timeout(secs);
        }
        if let Some(policy) = lookup(REFRESH_VAR) {
            config.refresh_policy = policy.parse()?;
        }
        if let Some(max) = lookup(MAX_PAGE_SIZE_VAR) {
            let max = parse_positive(MAX_PAGE_SIZE_VAR, &max)?;
            let max = u32::try_from(max).map_err(|_| ConfigError::Invalid {
                var: MAX_PAGE_SIZE_VAR,
                value: max.to_string(),
                reason: "too large".to_string(),
            })?;
            config.max_page_size = Some(max);
        }

        Ok(config)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            matching: MatchConfig::default(),
            max_page_size: None,
            refresh_policy: RefreshPolicy::default(),
            channel_capacity: 32,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
