//! Bearer token injection and 401 recovery.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderValue;

use super::{NetworkInterceptor, PendingRequest, PRIORITY_AUTH};
use crate::auth::TokenManager;
use crate::error::Result;
use crate::http::HttpResponse;

/// Attaches `Authorization: Bearer <token>` to outgoing requests and reacts
/// to 401 responses by triggering a token refresh.
///
/// When the refresh fails the stored credentials are cleared and the 401 is
/// surfaced to the caller unchanged; the request is not replayed.
pub struct AuthInterceptor {
    tokens: Arc<TokenManager>,
}

impl AuthInterceptor {
    /// Create an interceptor backed by the given token manager.
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl NetworkInterceptor for AuthInterceptor {
    fn priority(&self) -> i32 {
        PRIORITY_AUTH
    }

    async fn on_request(&self, request: &mut PendingRequest) -> Result<()> {
        if let Some(token) = self.tokens.access_token() {
            if let Ok(value) = HeaderValue::try_from(format!("Bearer {token}")) {
                request.headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(())
    }

    async fn on_response(&self, response: &HttpResponse) {
        if response.status() == 401 && !self.tokens.refresh_if_needed().await {
            tracing::warn!(
                target: "meridian_net::auth",
                url = response.url(),
                "unauthorized and refresh failed, clearing credentials"
            );
            self.tokens.handle_unauthorized();
        }
    }
}
