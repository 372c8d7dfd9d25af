//! Request/response interceptor chain.

mod auth;
mod logging;

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use url::Url;

pub use auth::AuthInterceptor;
pub use logging::LoggingInterceptor;

use crate::error::{NetworkError, Result};
use crate::http::{HttpMethod, HttpResponse};

/// Priority of the authentication interceptor.
pub const PRIORITY_AUTH: i32 = 100;
/// Priority of the logging interceptor.
pub const PRIORITY_LOGGING: i32 = 50;
/// Priority reserved for retry-adjacent interceptors.
pub const PRIORITY_RETRY: i32 = 10;

/// A request being prepared for dispatch.
///
/// Interceptors see the fully resolved form: absolute URL, merged headers,
/// serialized body. Mutations apply to the current attempt only; the original
/// descriptor is rebuilt from scratch on retry.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute request URL, query parameters included.
    pub url: Url,
    /// Headers to send, defaults already merged.
    pub headers: HeaderMap,
    /// The JSON body, if any.
    pub body: Option<serde_json::Value>,
}

/// Hooks invoked around every request attempt.
///
/// Interceptors run in descending priority order for `on_request` and
/// `on_response`; `on_error` folds the error through the chain in the same
/// order, letting an interceptor substitute a more specific error. All hooks
/// default to no-ops so implementations override only what they need.
#[async_trait]
pub trait NetworkInterceptor: Send + Sync {
    /// Ordering weight; higher runs earlier.
    fn priority(&self) -> i32 {
        0
    }

    /// Inspect or mutate the outgoing request. Returning an error aborts the
    /// attempt.
    async fn on_request(&self, _request: &mut PendingRequest) -> Result<()> {
        Ok(())
    }

    /// Observe the response. Side effects only; the response is not replaced.
    async fn on_response(&self, _response: &HttpResponse) {}

    /// Map or observe an error before it is returned to the caller.
    async fn on_error(&self, error: NetworkError) -> NetworkError {
        error
    }
}

/// Sort interceptors so the highest priority runs first.
pub(crate) fn sort_by_priority(interceptors: &mut [Arc<dyn NetworkInterceptor>]) {
    interceptors.sort_by_key(|i| std::cmp::Reverse(i.priority()));
}
