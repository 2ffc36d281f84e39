//! Analysis service configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";
pub const DEFAULT_INDEX_NAME: &str = "scoutpulse-soccer";

/// Upper bound on retries per request.
pub const MAX_RETRIES_CEILING: u32 = 10;

/// Shortest allowed delay between indexing status polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Clamp a configured retry count to [`MAX_RETRIES_CEILING`].
pub fn clamp_retries(requested: u32) -> u32 {
    requested.min(MAX_RETRIES_CEILING)
}

/// Raise a configured poll interval to at least [`MIN_POLL_INTERVAL`].
pub fn clamp_poll_interval(requested: Duration) -> Duration {
    requested.max(MIN_POLL_INTERVAL)
}

/// Configuration for the Twelve Labs client.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// API key; `None` leaves the gateway unconfigured
    pub api_key: Option<String>,
    /// Pre-provisioned index id
    pub index_id: Option<String>,
    /// Index looked up (or created) when no usable id is configured
    pub index_name: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay between indexing status polls
    pub poll_interval: Duration,
    /// Upper bound on waiting for indexing
    pub index_timeout: Duration,
    /// Results requested per search query
    pub page_limit: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_id: None,
            index_name: DEFAULT_INDEX_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            poll_interval: Duration::from_secs(5),
            index_timeout: Duration::from_secs(1800),
            page_limit: 5,
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                std::env::var(key)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default),
            )
        };

        Self {
            api_key: non_empty("TWELVE_LABS_API_KEY"),
            index_id: non_empty("TWELVE_LABS_INDEX_ID"),
            index_name: non_empty("TWELVE_LABS_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            base_url: non_empty("TWELVE_LABS_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: secs("TWELVE_LABS_TIMEOUT", 120),
            max_retries: clamp_retries(
                std::env::var("TWELVE_LABS_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            poll_interval: clamp_poll_interval(secs("TWELVE_LABS_POLL_INTERVAL", 5)),
            index_timeout: secs("TWELVE_LABS_INDEX_TIMEOUT", 1800),
            page_limit: std::env::var("TWELVE_LABS_PAGE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
