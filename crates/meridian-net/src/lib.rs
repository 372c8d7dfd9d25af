//! Networking runtime for Meridian applications.
//!
//! This crate provides the transport layer shared by every Meridian client:
//! an HTTP executor with an interceptor chain, bearer-token management with
//! single-flight refresh, retry with exponential backoff, and managed
//! WebSocket sessions with automatic reconnection.
//!
//! # HTTP
//!
//! Requests are described by immutable [`Request`] descriptors and executed
//! against a configured base URL. Every outcome is a [`NetworkResult`], a
//! three-state value that models success, failure, and in-flight progress
//! without exceptions or sentinel values.
//!
//! ```ignore
//! use meridian_net::{HttpExecutor, NetworkConfig, Request};
//!
//! let executor = HttpExecutor::new(NetworkConfig::production("https://api.example.com"))?;
//! let user: NetworkResult<User> = executor
//!     .execute_json(&Request::get("/users/me"))
//!     .await;
//! ```
//!
//! # Authentication
//!
//! The [`TokenManager`] owns credential state. Concurrent 401s collapse into
//! a single refresh exchange; requests observing a rotated token return
//! without touching the network.
//!
//! # WebSocket
//!
//! A [`WebSocketSession`] owns the connection lifecycle: keepalive pings,
//! message fan-out to broadcast subscribers, and a reconnection cycle with
//! linearly growing delays after an unexpected close.
//!
//! ```ignore
//! use meridian_net::{WebSocketConfig, WebSocketSession};
//!
//! let session = WebSocketSession::new(WebSocketConfig::new("wss://stream.example.com"));
//! let mut states = session.subscribe_state();
//! session.connect().await?;
//! ```

mod auth;
mod config;
mod error;
mod http;
mod interceptor;
mod manager;
mod result;
mod retry;
mod websocket;

pub use auth::{InMemoryTokenStore, TokenExchanger, TokenManager, TokenPair, TokenStore};
pub use config::NetworkConfig;
pub use error::{NetworkError, Result};
pub use self::http::{HttpExecutor, HttpMethod, HttpResponse, Request, RequestParams};
pub use interceptor::{
    AuthInterceptor, LoggingInterceptor, NetworkInterceptor, PendingRequest, PRIORITY_AUTH,
    PRIORITY_LOGGING, PRIORITY_RETRY,
};
pub use manager::NetworkManager;
pub use result::NetworkResult;
pub use retry::RetryPolicy;
pub use websocket::{WebSocketConfig, WebSocketEvents, WebSocketSession, WebSocketState, WsMessage};
