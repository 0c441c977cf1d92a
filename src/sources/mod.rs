//! Data source implementations.

mod duckduckgo;
mod wikipedia;

pub use duckduckgo::DuckDuckGo;
pub use wikipedia::Wikipedia;

use std::future::Future;
use std::time::Duration;

use crate::{Result, SearchError};

/// Runs `operation` under `deadline`, mapping expiry to [`SearchError::Timeout`].
///
/// Dropping the inner future on expiry cancels any in-flight request, so no
/// partial result survives.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout(operation.to_string())),
    }
}

/// Reason phrase for a status code, or an empty string for unknown codes.
pub(crate) fn status_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
        .to_string()
}
