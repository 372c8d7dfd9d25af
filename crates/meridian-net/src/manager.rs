//! Top-level composition of the networking runtime.

use std::sync::Arc;

use crate::auth::TokenManager;
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::http::HttpExecutor;
use crate::interceptor::{AuthInterceptor, LoggingInterceptor, NetworkInterceptor};
use crate::websocket::{WebSocketConfig, WebSocketSession};

/// Composes the HTTP executor and WebSocket session behind one handle.
///
/// Wires the standard interceptor chain: authentication always, logging when
/// the configuration enables it.
pub struct NetworkManager {
    executor: HttpExecutor,
    session: WebSocketSession,
    tokens: Arc<TokenManager>,
}

impl NetworkManager {
    /// Build a manager from the given configurations and token manager.
    pub fn new(
        config: NetworkConfig,
        ws_config: WebSocketConfig,
        tokens: Arc<TokenManager>,
    ) -> Result<Self> {
        let mut interceptors: Vec<Arc<dyn NetworkInterceptor>> =
            vec![Arc::new(AuthInterceptor::new(Arc::clone(&tokens)))];
        if config.enable_logging {
            interceptors.push(Arc::new(LoggingInterceptor::new()));
        }

        let executor = HttpExecutor::with_interceptors(config, interceptors)?;
        let session = WebSocketSession::new(ws_config);

        Ok(Self {
            executor,
            session,
            tokens,
        })
    }

    /// The HTTP executor.
    pub fn executor(&self) -> &HttpExecutor {
        &self.executor
    }

    /// The WebSocket session.
    pub fn session(&self) -> &WebSocketSession {
        &self.session
    }

    /// The token manager.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Disconnect the WebSocket session and release its tasks.
    pub async fn shutdown(&self) {
        self.session.disconnect().await;
    }
}

impl std::fmt::Debug for NetworkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkManager")
            .field("executor", &self.executor)
            .field("session", &self.session)
            .finish()
    }
}
