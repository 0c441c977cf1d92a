//! Data source trait and configuration.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Result, SearchError, Topic, TopicData};

/// Number of topics returned when the caller passes a zero limit.
pub const DEFAULT_LIMIT: usize = 5;

/// Configuration for a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name of the source.
    pub name: String,
    /// Short identifier (e.g., "ddg" for DuckDuckGo).
    pub shortcut: String,
    /// Base endpoint queried by the source.
    #[serde(default)]
    pub base_url: String,
    /// Value sent in the `User-Agent` header.
    #[serde(default)]
    pub user_agent: String,
    /// Deadline for topic and data fetches, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Deadline for availability checks, in seconds.
    #[serde(default = "default_check_timeout")]
    pub check_timeout: u64,
    /// Limit applied when a caller asks for zero topics.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Restricts results to hosts ending with this suffix (`site:` prefix allowed).
    #[serde(default)]
    pub site_filter: Option<String>,
    /// Whether the source is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout() -> u64 {
    8
}

fn default_check_timeout() -> u64 {
    5
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_enabled() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            base_url: String::new(),
            user_agent: String::new(),
            timeout: default_timeout(),
            check_timeout: default_check_timeout(),
            default_limit: DEFAULT_LIMIT,
            site_filter: None,
            enabled: true,
        }
    }
}

impl SourceConfig {
    /// Fills blank fields with the given defaults and validates the result.
    ///
    /// Running it twice yields the same configuration.
    pub fn normalize(&mut self, base_url: &str, user_agent: &str) -> Result<()> {
        if self.base_url.trim().is_empty() {
            self.base_url = base_url.to_string();
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = user_agent.to_string();
        }
        self.base_url = self.base_url.trim().to_string();
        self.site_filter = self
            .site_filter
            .take()
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty());
        self.validate()
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(SearchError::Config("timeout must be greater than 0".into()));
        }
        if self.check_timeout == 0 {
            return Err(SearchError::Config(
                "check_timeout must be greater than 0".into(),
            ));
        }
        if self.default_limit == 0 {
            return Err(SearchError::Config(
                "default_limit must be greater than 0".into(),
            ));
        }
        let base = Url::parse(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(SearchError::Config(format!(
                "base_url must be an absolute http(s) URL: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Returns the fetch deadline.
    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Returns the availability-check deadline.
    pub fn check_deadline(&self) -> Duration {
        Duration::from_secs(self.check_timeout)
    }

    /// Resolves a caller-supplied limit, replacing zero with the default.
    pub fn effective_limit(&self, limit: usize) -> usize {
        if limit == 0 {
            self.default_limit
        } else {
            limit
        }
    }
}

/// Contract implemented by every topic backend.
///
/// `init` runs once before the source is shared; the remaining operations take
/// `&self` and hold no per-call state on the source, so one instance can serve
/// concurrent callers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the source configuration.
    fn config(&self) -> &SourceConfig;

    /// Validates and normalizes configuration. Never touches the network.
    fn init(&mut self) -> Result<()>;

    /// Issues one bounded request; any failure yields `false`.
    async fn check_availability(&self) -> bool;

    /// Searches for topics matching `query`.
    async fn fetch_topics(&self, limit: usize, query: &str) -> Result<Vec<Topic>>;

    /// Expands a topic into detail records. Sources without detail support return
    /// an empty vector.
    async fn fetch_data(&self, limit: usize, topic_id: i64) -> Result<Vec<TopicData>>;

    /// Returns the source name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the source shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }

    /// Returns whether the source is enabled.
    fn is_enabled(&self) -> bool {
        self.config().enabled
    }
}

/// Rejects blank queries before any network I/O happens.
pub(crate) fn require_query<'a>(query: &'a str, source_name: &str) -> Result<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidQuery(format!(
            "missing search input for {source_name}"
        )));
    }
    Ok(query)
}
