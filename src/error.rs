//! Error types for the data source library.

use thiserror::Error;

/// Result type alias for data source operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while querying a data source.
///
/// An empty result set is never an error: sources return `Ok(vec![])`
/// when a query simply has no matches.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Caller supplied a blank query or an invalid identifier.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code.
    #[error("{source_name} request failed: status {status}: {message}")]
    Status {
        source_name: String,
        status: u16,
        message: String,
    },

    /// Operation did not finish within its deadline.
    #[error("{0} timed out")]
    Timeout(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Upstream answered successfully but embedded an error payload.
    #[error("{source_name} error: {message}")]
    Upstream {
        source_name: String,
        message: String,
    },

    /// Invalid source configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Returns true for connection failures, bad status codes and deadline expiry.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SearchError::Http(_) | SearchError::Status { .. } | SearchError::Timeout(_)
        )
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}
