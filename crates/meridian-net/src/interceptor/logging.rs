//! Structured request/response logging.

use async_trait::async_trait;
use http::HeaderMap;

use super::{NetworkInterceptor, PendingRequest, PRIORITY_LOGGING};
use crate::error::{NetworkError, Result};
use crate::http::HttpResponse;

const REDACTED_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Logs requests, responses, and errors through `tracing`.
///
/// Credential-bearing headers are masked before emission.
#[derive(Debug, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    /// Create a logging interceptor.
    pub fn new() -> Self {
        Self
    }
}

fn describe_headers(headers: &HeaderMap) -> String {
    let mut parts = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        if REDACTED_HEADERS.contains(&name.as_str()) {
            parts.push(format!("{name}: ***"));
        } else {
            parts.push(format!("{name}: {}", value.to_str().unwrap_or("<binary>")));
        }
    }
    parts.join(", ")
}

#[async_trait]
impl NetworkInterceptor for LoggingInterceptor {
    fn priority(&self) -> i32 {
        PRIORITY_LOGGING
    }

    async fn on_request(&self, request: &mut PendingRequest) -> Result<()> {
        tracing::info!(
            target: "meridian_net::http",
            method = %request.method,
            url = %request.url,
            headers = %describe_headers(&request.headers),
            has_body = request.body.is_some(),
            "--> request"
        );
        Ok(())
    }

    async fn on_response(&self, response: &HttpResponse) {
        tracing::info!(
            target: "meridian_net::http",
            status = response.status(),
            url = response.url(),
            body_len = response.content_length(),
            "<-- response"
        );
    }

    async fn on_error(&self, error: NetworkError) -> NetworkError {
        tracing::error!(target: "meridian_net::http", %error, "request failed");
        error
    }
}
