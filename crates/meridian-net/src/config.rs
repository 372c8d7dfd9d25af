//! Configuration for the HTTP executor.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for an [`HttpExecutor`](crate::http::HttpExecutor).
///
/// Immutable once handed to an executor; one instance is selected per
/// environment at composition time.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Base URL that request paths are appended to.
    pub base_url: String,
    /// Total request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Socket read timeout.
    pub socket_timeout: Duration,
    /// Maximum number of retries after the first attempt.
    pub retry_attempts: u32,
    /// Base delay for exponential backoff between retries.
    pub retry_delay: Duration,
    /// Whether the logging interceptor is installed.
    pub enable_logging: bool,
    /// Default headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl NetworkConfig {
    /// Create a configuration with default settings for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            socket_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
            enable_logging: true,
            headers: HashMap::new(),
        }
    }

    /// Development preset: verbose logging and a generous timeout.
    pub fn development(base_url: impl Into<String>) -> Self {
        Self {
            timeout: Duration::from_secs(60),
            enable_logging: true,
            ..Self::new(base_url)
        }
    }

    /// Production preset: logging off, tighter timeout, more retries.
    pub fn production(base_url: impl Into<String>) -> Self {
        Self {
            timeout: Duration::from_secs(15),
            retry_attempts: 5,
            enable_logging: false,
            ..Self::new(base_url)
        }
    }

    /// Set the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the socket read timeout.
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Set the maximum number of retries after the first attempt.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the base delay for exponential backoff between retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Enable or disable the logging interceptor.
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Add a default header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add multiple default headers.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}
