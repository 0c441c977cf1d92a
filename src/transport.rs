//! Transport abstraction for retrieving upstream responses.

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// A GET request issued by a data source.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Absolute target URL.
    pub url: String,
    /// Header name/value pairs sent with the request.
    pub headers: Vec<(String, String)>,
    /// Upper bound for the request, including reading the body.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Creates a request with no headers.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the value of the first header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes GET requests on behalf of data sources.
///
/// Retry, TLS and connection pooling belong to the implementation. Implementations
/// must be safe to share between concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `request.url`; non-2xx statuses are returned, not raised.
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse>;
}
