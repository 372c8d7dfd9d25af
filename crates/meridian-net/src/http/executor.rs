//! HTTP executor: dispatch, interceptor chain, and retry loop.

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::http::{HttpResponse, Request, RequestParams};
use crate::interceptor::{sort_by_priority, NetworkInterceptor, PendingRequest};
use crate::result::NetworkResult;
use crate::retry::RetryPolicy;

/// Executes request descriptors against a configured base URL.
///
/// Each call runs the interceptor chain, dispatches through a shared
/// connection pool, and retries transient failures with exponential backoff.
/// The executor is cheap to share behind an `Arc`; the underlying client
/// pools connections across clones.
pub struct HttpExecutor {
    client: reqwest::Client,
    config: NetworkConfig,
    interceptors: Vec<Arc<dyn NetworkInterceptor>>,
    retry: RetryPolicy,
}

impl HttpExecutor {
    /// Create an executor with no interceptors.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_interceptors(config, Vec::new())
    }

    /// Create an executor with the given interceptor chain.
    pub fn with_interceptors(
        config: NetworkConfig,
        mut interceptors: Vec<Arc<dyn NetworkInterceptor>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.socket_timeout)
            .build()
            .map_err(NetworkError::from)?;

        sort_by_priority(&mut interceptors);
        let retry = RetryPolicy::from_config(&config);

        Ok(Self {
            client,
            config,
            interceptors,
            retry,
        })
    }

    /// Replace the retry policy derived from the configuration.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The executor's configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Execute a request descriptor.
    ///
    /// Non-2xx statuses are surfaced as `Error`; transient failures are
    /// retried up to the policy's budget before the final error is returned.
    pub async fn execute(&self, request: &Request) -> NetworkResult<HttpResponse> {
        match self.execute_inner(request).await {
            Ok(response) => NetworkResult::Success(response),
            Err(error) => NetworkResult::Error(self.run_error_phase(error).await),
        }
    }

    /// Execute a request descriptor and decode the body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &Request) -> NetworkResult<T> {
        match self.execute(request).await {
            NetworkResult::Success(response) => match response.json() {
                Ok(value) => NetworkResult::Success(value),
                Err(error) => NetworkResult::Error(self.run_error_phase(error).await),
            },
            NetworkResult::Error(error) => NetworkResult::Error(error),
            NetworkResult::Loading(partial) => NetworkResult::Loading(partial),
        }
    }

    async fn execute_inner(&self, request: &Request) -> Result<HttpResponse> {
        let mut attempt: u32 = 0;
        loop {
            let error = match self.attempt(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    let error = NetworkError::from_status(response.status());
                    // Interceptors still observe the failed response, the
                    // auth interceptor reacts to 401 here.
                    for interceptor in &self.interceptors {
                        interceptor.on_response(&response).await;
                    }
                    error
                }
                Err(error) => error,
            };

            if self.retry.should_retry(attempt, &error) {
                let delay = self.retry.delay_for(attempt);
                tracing::debug!(
                    target: "meridian_net::http",
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }

    /// One dispatch: resolve the descriptor, run the request phase, send,
    /// buffer, run the response phase.
    async fn attempt(&self, request: &Request) -> Result<HttpResponse> {
        let mut pending = self.resolve(request)?;

        for interceptor in &self.interceptors {
            interceptor.on_request(&mut pending).await?;
        }

        let mut builder = self
            .client
            .request(pending.method.to_reqwest(), pending.url.clone())
            .headers(pending.headers.clone());
        if let Some(body) = &pending.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let raw = builder.send().await.map_err(NetworkError::from)?;
        let response = HttpResponse::from_reqwest(raw).await?;

        if response.is_success() {
            for interceptor in &self.interceptors {
                interceptor.on_response(&response).await;
            }
        }

        Ok(response)
    }

    /// Resolve a descriptor into an absolute, header-merged pending request.
    fn resolve(&self, request: &Request) -> Result<PendingRequest> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = request.path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))?;

        let mut body = None;
        match &request.params {
            RequestParams::None => {}
            RequestParams::Query(pairs) => {
                let mut query = url.query_pairs_mut();
                for (key, value) in pairs {
                    query.append_pair(key, value);
                }
            }
            RequestParams::Body(value) => body = Some(value.clone()),
            RequestParams::Invalid(error) => return Err(error.clone()),
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.config.headers {
            insert_header(&mut headers, name, value);
        }
        if let Some(overrides) = &request.headers {
            for (name, value) in overrides {
                insert_header(&mut headers, name, value);
            }
        }
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(PendingRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    async fn run_error_phase(&self, mut error: NetworkError) -> NetworkError {
        for interceptor in &self.interceptors {
            error = interceptor.on_error(error).await;
        }
        error
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => {
            tracing::warn!(target: "meridian_net::http", name, "skipping invalid header");
        }
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("base_url", &self.config.base_url)
            .field("interceptors", &self.interceptors.len())
            .field("retry", &self.retry)
            .finish()
    }
}
