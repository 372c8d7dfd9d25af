//! Request descriptor types.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP PATCH method.
    Patch,
    /// HTTP HEAD method.
    Head,
    /// HTTP OPTIONS method.
    Options,
}

impl HttpMethod {
    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
        }
    }
}

/// Parameter mode of a request descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestParams {
    /// No parameters.
    #[default]
    None,
    /// Query string key/value pairs.
    Query(Vec<(String, String)>),
    /// JSON request body.
    Body(serde_json::Value),
    /// A body that failed to encode; surfaced as the carried error when the
    /// request executes, before anything reaches the network.
    Invalid(crate::error::NetworkError),
}

/// An immutable description of one HTTP request.
///
/// Descriptors are side-effect free and re-playable: the executor consumes
/// the same descriptor once per attempt, so a retried request is issued
/// byte-for-byte identically.
#[derive(Clone, Debug)]
pub struct Request {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Path relative to the executor's configured base URL.
    pub path: String,
    /// Query or body parameters.
    pub params: RequestParams,
    /// Per-request header overrides, merged over the configured defaults.
    pub headers: Option<HashMap<String, String>>,
    /// Per-request timeout override.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a descriptor with the given method and path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: RequestParams::None,
            headers: None,
            timeout: None,
        }
    }

    /// A GET descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// A POST descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// A PUT descriptor.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// A DELETE descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// A PATCH descriptor.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// A HEAD descriptor.
    pub fn head(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, path)
    }

    /// An OPTIONS descriptor.
    pub fn options(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Options, path)
    }

    /// Add a query parameter. Replaces a pending body, if any.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self.params {
            RequestParams::Query(ref mut pairs) => pairs.push((key.into(), value.into())),
            _ => self.params = RequestParams::Query(vec![(key.into(), value.into())]),
        }
        self
    }

    /// Add multiple query parameters.
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        for (key, value) in pairs {
            self = self.query(key, value);
        }
        self
    }

    /// Set a JSON body from a serializable value.
    ///
    /// A value that fails to serialize poisons the descriptor: executing it
    /// yields a `Serialization` error without dispatching.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.params = match serde_json::to_value(body) {
            Ok(value) => RequestParams::Body(value),
            Err(e) => RequestParams::Invalid(e.into()),
        };
        self
    }

    /// Add a header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
