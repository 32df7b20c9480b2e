//! # Fetcher Configuration Module
//!
//! Configuration options for the forum page fetcher, including the thread
//! URL, the mandatory inter-request delay, and request headers. Uses a
//! builder pattern for flexible configuration.

use std::time::Duration;

/// Thread scraped by the automated run
pub const DEFAULT_THREAD_URL: &str =
    "https://worldbeyblade.org/Thread-Winning-Combinations-at-WBO-Organized-Events-Beyblade-X-BBX";

/// Configuration for the forum fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Full URL of the thread, without the page query parameter
    pub thread_url: String,

    /// Mandatory delay in milliseconds before every network request
    pub rate_limit_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent to use for requests
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            thread_url: DEFAULT_THREAD_URL.to_string(),
            rate_limit_ms: 2000,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Builder for FetcherConfig
#[derive(Debug, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetcherConfig::default(),
        }
    }

    /// Set the thread URL
    pub fn thread_url(mut self, thread_url: impl Into<String>) -> Self {
        self.config.thread_url = thread_url.into();
        self
    }

    /// Set the delay in milliseconds before each request
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

impl FetcherConfig {
    /// Create a new builder
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::new()
    }

    /// Get the rate limit as a Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
