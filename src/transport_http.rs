//! HTTP transport using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::{Result, SearchError};

/// A transport that issues plain HTTP requests via reqwest.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an `HttpTransport` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| request_error(e, request))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| request_error(e, request))?;
        debug!(url = %request.url, status, bytes = body.len(), "response received");

        Ok(TransportResponse { status, body })
    }
}

/// Client-side timeouts surface as [`SearchError::Timeout`] like deadline expiry.
fn request_error(error: reqwest::Error, request: &TransportRequest) -> SearchError {
    if error.is_timeout() {
        SearchError::Timeout(format!("GET {}", request.url))
    } else {
        SearchError::Http(error)
    }
}
