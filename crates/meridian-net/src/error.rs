//! Error types for the networking runtime.

use thiserror::Error;

/// Classified network errors.
///
/// Every failure surfaced by the runtime is one of these five kinds; raw
/// transport errors never cross the executor or session boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// No connectivity: DNS failure, connection refused, or host unreachable.
    #[error("network is unavailable")]
    NetworkUnavailable,
    /// The server responded with an error status (4xx or 5xx).
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Human-readable description of the failure.
        message: String,
    },
    /// Request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Request, connect, or socket timeout exceeded.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Uncategorized failure.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl NetworkError {
    /// The HTTP status code, when this error came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an [`NetworkError::HttpStatus`] from a status code, using the
    /// canonical reason phrase when no better message is available.
    pub(crate) fn from_status(status: u16) -> Self {
        let message = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("HTTP error")
            .to_string();
        Self::HttpStatus { status, message }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::NetworkUnavailable
        } else if err.is_decode() {
            Self::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::Unknown(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for NetworkError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use std::io::ErrorKind;
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::Io(io) => match io.kind() {
                ErrorKind::TimedOut => Self::Timeout(io.to_string()),
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected => Self::NetworkUnavailable,
                _ => Self::Unknown(io.to_string()),
            },
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::NetworkUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
