//! WebSocket session configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for a [`WebSocketSession`](crate::websocket::WebSocketSession).
#[derive(Clone, Debug)]
pub struct WebSocketConfig {
    /// The `ws://` or `wss://` endpoint.
    pub url: String,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Handshake timeout.
    pub timeout: Duration,
    /// Maximum reconnection attempts after an unexpected close. Zero disables
    /// automatic reconnection.
    pub reconnect_attempts: u32,
    /// Base delay between reconnection attempts; scaled linearly by attempt.
    pub reconnect_delay: Duration,
    /// Extra headers sent with the handshake.
    pub headers: HashMap<String, String>,
}

impl WebSocketConfig {
    /// Create a configuration with default settings for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_interval: Duration::from_secs(20),
            timeout: Duration::from_secs(30),
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(5),
            headers: HashMap::new(),
        }
    }

    /// Set the keepalive ping interval.
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set the handshake timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of reconnection attempts.
    pub fn reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect_attempts = attempts;
        self
    }

    /// Set the base delay between reconnection attempts.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Disable automatic reconnection.
    pub fn no_reconnect(mut self) -> Self {
        self.reconnect_attempts = 0;
        self
    }

    /// Add a handshake header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
