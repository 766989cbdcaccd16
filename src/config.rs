//! Configuration Module
//!
//! Handles loading the page cache and demo settings from environment variables.

use std::env;
use std::time::Duration;

/// Default demo target, a slow endpoint that makes cache hits visible.
pub const DEFAULT_DEMO_URL: &str =
    "http://slowwly.robertomurray.co.uk/delay/3000/url/https://www.google.com";

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of a cached page in seconds
    pub page_ttl: u64,
    /// HTTP fetch timeout in seconds
    pub fetch_timeout: u64,
    /// URL fetched by the demo harness
    pub demo_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PAGE_TTL` - Cached page lifetime in seconds (default: 10)
    /// - `FETCH_TIMEOUT` - HTTP fetch timeout in seconds (default: 30)
    /// - `DEMO_URL` - URL used by the demo harness
    pub fn from_env() -> Self {
        Self {
            page_ttl: env::var("PAGE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(10),
            fetch_timeout: env::var("FETCH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            demo_url: env::var("DEMO_URL").unwrap_or_else(|_| DEFAULT_DEMO_URL.to_string()),
        }
    }

    /// Page TTL as a Duration.
    pub fn page_ttl(&self) -> Duration {
        Duration::from_secs(self.page_ttl)
    }

    /// Fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_ttl: 10,
            fetch_timeout: 30,
            demo_url: DEFAULT_DEMO_URL.to_string(),
        }
    }
}
