//! Access/refresh token state with single-flight refresh semantics.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An access token plus its optional refresh token.
///
/// Created on successful auth, replaced on refresh, cleared on logout or an
/// irrecoverable 401.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// The bearer access token.
    pub access_token: String,
    /// The refresh token, when the server issued one.
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Create a token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Persistent credential storage.
///
/// Implementations must be internally synchronized; the [`TokenManager`] is
/// the only component that writes through this interface.
pub trait TokenStore: Send + Sync {
    /// The current access token, if any.
    fn access_token(&self) -> Option<String>;
    /// The current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;
    /// Persist a new token pair, replacing any previous one.
    fn save(&self, tokens: TokenPair);
    /// Drop all stored tokens.
    fn clear(&self);
}

/// In-memory token store for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.lock().as_ref().map(|t| t.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.lock().as_ref().and_then(|t| t.refresh_token.clone())
    }

    fn save(&self, tokens: TokenPair) {
        *self.tokens.lock() = Some(tokens);
    }

    fn clear(&self) {
        *self.tokens.lock() = None;
    }
}

/// External endpoint that exchanges a refresh token for a new pair.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchange `refresh_token` for a fresh [`TokenPair`].
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair>;
}

/// Owns token state and serializes refresh attempts.
///
/// Concurrent 401 responses from parallel requests funnel through one
/// refresh: callers queue on the internal lock, and a caller that acquires it
/// after another refresh already completed observes the rotated token and
/// returns without a second exchange. Refresh tokens are typically
/// single-use, so duplicate exchanges would invalidate each other.
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    exchanger: Arc<dyn TokenExchanger>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl TokenManager {
    /// Create a manager over the given store and exchange endpoint.
    pub fn new(store: Arc<dyn TokenStore>, exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            store,
            exchanger,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.store.access_token()
    }

    /// Persist a freshly issued token pair (e.g. after sign-in).
    pub fn save_tokens(&self, tokens: TokenPair) {
        self.store.save(tokens);
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns `true` when a valid access token is in place afterwards,
    /// `false` when there is no refresh token or the exchange failed. The
    /// lock is released on cancellation; a cancelled refresh never wedges the
    /// manager in a refreshing state.
    pub async fn refresh_if_needed(&self) -> bool {
        let seen = self.store.access_token();
        let _guard = self.refresh_lock.lock().await;

        // Another caller refreshed while we were queued on the lock.
        if self.store.access_token() != seen {
            return true;
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            return false;
        };

        match self.exchanger.exchange(&refresh_token).await {
            Ok(tokens) => {
                self.store.save(tokens);
                true
            }
            Err(error) => {
                tracing::warn!(target: "meridian_net::auth", %error, "token refresh failed");
                false
            }
        }
    }

    /// Clear stored tokens after an irrecoverable 401. The caller must
    /// re-authenticate; the original request is not replayed.
    pub fn handle_unauthorized(&self) {
        self.store.clear();
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("has_token", &self.store.access_token().is_some())
            .finish()
    }
}
