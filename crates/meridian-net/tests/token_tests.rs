//! Token manager tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use meridian_net::{
    InMemoryTokenStore, NetworkError, TokenExchanger, TokenManager, TokenPair, TokenStore,
};

/// Exchanger that counts invocations and optionally dwells to widen the race
/// window.
struct CountingExchanger {
    calls: AtomicU32,
    delay: Duration,
    fail: bool,
}

impl CountingExchanger {
    fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
            fail: true,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchanger for CountingExchanger {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, NetworkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(NetworkError::HttpStatus {
                status: 401,
                message: "invalid refresh token".into(),
            });
        }
        Ok(TokenPair::new(
            format!("access-{call}"),
            Some(format!("{refresh_token}-rotated")),
        ))
    }
}

fn seeded_store() -> Arc<InMemoryTokenStore> {
    let store = Arc::new(InMemoryTokenStore::new());
    store.save(TokenPair::new("stale-access", Some("refresh-1".to_string())));
    store
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let store = seeded_store();
    let exchanger = Arc::new(CountingExchanger::new(Duration::ZERO));
    let manager = TokenManager::new(store.clone(), exchanger.clone());

    assert!(manager.refresh_if_needed().await);
    assert_eq!(exchanger.calls(), 1);
    assert_eq!(manager.access_token().as_deref(), Some("access-0"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1-rotated"));
}

#[tokio::test]
async fn test_concurrent_refreshes_exchange_once() {
    let store = seeded_store();
    let exchanger = Arc::new(CountingExchanger::new(Duration::from_millis(50)));
    let manager = Arc::new(TokenManager::new(store, exchanger.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move { manager.refresh_if_needed().await }));
    }

    for handle in handles {
        assert!(handle.await.unwrap(), "every queued caller must succeed");
    }
    assert_eq!(exchanger.calls(), 1, "only one caller may hit the exchanger");
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails() {
    let store = Arc::new(InMemoryTokenStore::new());
    store.save(TokenPair::new("access-only", None));
    let exchanger = Arc::new(CountingExchanger::new(Duration::ZERO));
    let manager = TokenManager::new(store, exchanger.clone());

    assert!(!manager.refresh_if_needed().await);
    assert_eq!(exchanger.calls(), 0);
}

#[tokio::test]
async fn test_failed_refresh_keeps_stored_tokens() {
    let store = seeded_store();
    let exchanger = Arc::new(CountingExchanger::failing());
    let manager = TokenManager::new(store, exchanger.clone());

    assert!(!manager.refresh_if_needed().await);
    assert_eq!(exchanger.calls(), 1);
    // The caller decides what to do with a failed refresh; the manager does
    // not clear state on its own.
    assert_eq!(manager.access_token().as_deref(), Some("stale-access"));
}

#[tokio::test]
async fn test_handle_unauthorized_clears_tokens() {
    let store = seeded_store();
    let exchanger = Arc::new(CountingExchanger::new(Duration::ZERO));
    let manager = TokenManager::new(store.clone(), exchanger);

    manager.handle_unauthorized();
    assert_eq!(manager.access_token(), None);
    assert_eq!(store.refresh_token(), None);
}

#[tokio::test]
async fn test_save_tokens_replaces_pair() {
    let store = Arc::new(InMemoryTokenStore::new());
    let exchanger = Arc::new(CountingExchanger::new(Duration::ZERO));
    let manager = TokenManager::new(store, exchanger);

    assert_eq!(manager.access_token(), None);
    manager.save_tokens(TokenPair::new("fresh", Some("refresh".to_string())));
    assert_eq!(manager.access_token().as_deref(), Some("fresh"));
}
