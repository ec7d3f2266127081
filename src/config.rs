//! Client configuration

use std::env;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;

/// Default NewsCatcher v3 API host
pub const DEFAULT_BASE_URL: &str = "https://v3-api.newscatcherapi.com";

/// Environment variable holding the API token
pub const API_KEY_ENV: &str = "NEWSCATCHER_API_KEY";

/// Environment variable overriding the API host
pub const BASE_URL_ENV: &str = "NEWSCATCHER_BASE_URL";

/// Configuration for [`NewsCatcherClient`](crate::NewsCatcherClient)
///
/// # Example
///
/// ```
/// use newscatcher_client_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_api_key("your_api_key_here")
///     .with_timeout(Duration::from_secs(60))
///     .with_rate_limit(2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API token sent in the `x-api-token` header
    pub api_key: Option<String>,
    /// Override for the API host
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Override for the `User-Agent` header
    pub user_agent: Option<String>,
    /// Requests per second; `None` uses [`RateLimiter::DEFAULT_RATE`]
    pub rate_limit: Option<f64>,
    /// Backoff for transient failures
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(30),
            user_agent: None,
            rate_limit: None,
            retry_config: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `NEWSCATCHER_API_KEY` and `NEWSCATCHER_BASE_URL`
    ///
    /// Unset or empty variables are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(key) = env::var(API_KEY_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(url) = env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url);
        }
        config
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.rate_limit = Some(requests_per_second);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Base URL without a trailing slash
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("newscatcher-client-rs/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(RateLimiter::DEFAULT_RATE)
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}
