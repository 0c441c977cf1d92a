//! DuckDuckGo data source backed by the HTML results page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::{status_reason, with_deadline};
use crate::document::{HtmlDocument, SearchDocument};
use crate::extract::{ExtractionRules, Extractor};
use crate::source::require_query;
use crate::transport::{Transport, TransportRequest};
use crate::transport_http::HttpTransport;
use crate::{DataSource, Result, SearchError, SourceConfig, Topic, TopicData};

const DEFAULT_BASE_URL: &str = "https://duckduckgo.com/html/";
const DEFAULT_USER_AGENT: &str = "locus/duckduckgo-datasource";
const SITE: &str = "duckduckgo";

/// DuckDuckGo data source.
///
/// DuckDuckGo has no official search API, so topics are scraped from the HTML
/// endpoint. Detail expansion is not supported: [`DataSource::fetch_data`]
/// always returns an empty vector.
pub struct DuckDuckGo {
    config: SourceConfig,
    transport: Arc<dyn Transport>,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo source using an HTTP transport.
    pub fn new() -> Self {
        Self {
            config: SourceConfig {
                name: "DuckDuckGo".to_string(),
                shortcut: "ddg".to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                ..Default::default()
            },
            transport: Arc::new(HttpTransport::new()),
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the transport used for requests.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Restricts results to one host; `example.com` and `site:example.com` are
    /// both accepted.
    pub fn with_site_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.site_filter = Some(filter.into());
        self
    }

    /// Overrides the search endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets the fetch deadline in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Builds the search URL, e.g. `https://duckduckgo.com/html/?q=site%3Aexample.com+rust`.
    fn build_search_url(&self, query: &str) -> Result<String> {
        let base = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)?;
        url.query_pairs_mut()
            .append_pair("q", &self.build_query(query));
        Ok(url.into())
    }

    /// Prefixes the query with a `site:` qualifier when a filter is configured.
    fn build_query(&self, query: &str) -> String {
        let filter = self
            .config
            .site_filter
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if filter.is_empty() {
            query.to_string()
        } else if filter.starts_with("site:") {
            format!("{} {}", filter, query)
        } else {
            format!("site:{} {}", filter, query)
        }
    }

    fn request(&self, url: String, timeout: Duration) -> TransportRequest {
        let request = TransportRequest::new(url, timeout).with_header("Accept", "text/html");
        if self.config.user_agent.is_empty() {
            request
        } else {
            request.with_header("User-Agent", self.config.user_agent.as_str())
        }
    }

    fn parse_topics(&self, html: &str, limit: usize) -> Result<Vec<Topic>> {
        let document = HtmlDocument::parse(html)?;
        if let Some(title) = document.title() {
            debug!(%title, "duckduckgo page title");
        }

        let extractor = Extractor::new(
            Url::parse(&self.config.base_url)?,
            ExtractionRules::DUCKDUCKGO,
            SITE,
        );
        extractor.extract(&document, limit, self.config.site_filter.as_deref())
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for DuckDuckGo {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn init(&mut self) -> Result<()> {
        self.config.normalize(DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }

    async fn check_availability(&self) -> bool {
        let url = match self.build_search_url("duckduckgo") {
            Ok(url) => url,
            Err(e) => {
                warn!("duckduckgo availability check failed: {}", e);
                return false;
            }
        };
        let deadline = self.config.check_deadline();
        let request = self.request(url, deadline);

        let check = with_deadline(deadline, "duckduckgo availability check", async {
            let response = self.transport.get(&request).await?;
            if !(200..400).contains(&response.status) {
                return Err(SearchError::Status {
                    source_name: SITE.to_string(),
                    status: response.status,
                    message: status_reason(response.status),
                });
            }
            HtmlDocument::parse(&response.body).map(|_| ())
        });

        match check.await {
            Ok(()) => true,
            Err(e) => {
                warn!("duckduckgo availability check failed: {}", e);
                false
            }
        }
    }

    async fn fetch_topics(&self, limit: usize, query: &str) -> Result<Vec<Topic>> {
        let query = require_query(query, SITE)?;
        let limit = self.config.effective_limit(limit);
        let url = self.build_search_url(query)?;
        debug!(%url, limit, "duckduckgo search");

        let deadline = self.config.fetch_deadline();
        let request = self.request(url, deadline);

        with_deadline(deadline, "duckduckgo fetch_topics", async {
            let response = self.transport.get(&request).await?;
            if !response.is_success() {
                return Err(SearchError::Status {
                    source_name: SITE.to_string(),
                    status: response.status,
                    message: status_reason(response.status),
                });
            }
            let topics = self.parse_topics(&response.body, limit)?;
            debug!(count = topics.len(), "duckduckgo topics extracted");
            Ok(topics)
        })
        .await
    }

    async fn fetch_data(&self, _limit: usize, _topic_id: i64) -> Result<Vec<TopicData>> {
        Ok(Vec::new())
    }
}
