//! Configuration types for ClassPair

use std::time::Duration;

/// Default base URL of the device-auth service.
pub const DEFAULT_API_BASE_URL: &str = "https://dev-api.penpencil.co/clicker-backend/v1";

/// Default interval between authorization status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default per-request timeout for the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Main configuration for the pairing login flow
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote authentication service
    pub api_base_url: String,
    /// Interval between status polls while waiting for authorization
    pub poll_interval: Duration,
    /// Hard timeout applied to every HTTP request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder pattern: set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builder pattern: set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
