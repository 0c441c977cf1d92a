//! Wikipedia data source using the MediaWiki API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::with_deadline;
use crate::source::require_query;
use crate::transport::{Transport, TransportRequest};
use crate::transport_http::HttpTransport;
use crate::{DataSource, Result, SearchError, SourceConfig, Topic, TopicData};

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/w/api.php";
const DEFAULT_USER_AGENT: &str = "locus/ask";
const SITE: &str = "wikipedia";

/// Wikipedia data source.
///
/// Topics are search hits keyed by page id; [`DataSource::fetch_data`] expands a
/// page id into its plain-text introduction.
pub struct Wikipedia {
    config: SourceConfig,
    transport: Arc<dyn Transport>,
}

impl Wikipedia {
    /// Creates a new Wikipedia source for the English wiki.
    pub fn new() -> Self {
        Self {
            config: SourceConfig {
                name: "Wikipedia".to_string(),
                shortcut: "wiki".to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                ..Default::default()
            },
            transport: Arc::new(HttpTransport::new()),
        }
    }

    /// Sets the Wikipedia language.
    pub fn with_language(mut self, language: impl AsRef<str>) -> Self {
        self.config.base_url = format!("https://{}.wikipedia.org/w/api.php", language.as_ref());
        self
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

    /// Overrides the API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets the fetch deadline in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    /// Canonical page URL on the configured wiki, e.g. `https://en.wikipedia.org/?curid=42`.
    fn page_url(&self, page_id: i64) -> Result<String> {
        let mut url = Url::parse(&self.config.base_url)?.join("/")?;
        url.set_query(Some(&format!("curid={}", page_id)));
        Ok(url.into())
    }

    /// Issues a GET with `params` and decodes the JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let mut url = Url::parse(self.config.base_url.trim_end_matches('/'))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));

        let mut request = TransportRequest::new(url.as_str(), timeout)
            .with_header("Accept", "application/json");
        if !self.config.user_agent.is_empty() {
            request = request.with_header("User-Agent", self.config.user_agent.as_str());
        }

        debug!(url = %request.url, "wikipedia request");
        let response = self.transport.get(&request).await?;
        if !response.is_success() {
            return Err(SearchError::Status {
                source_name: SITE.to_string(),
                status: response.status,
                message: response.body.trim().to_string(),
            });
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    info: String,
}

impl ApiError {
    fn into_error(self) -> SearchError {
        SearchError::Upstream {
            source_name: SITE.to_string(),
            message: self.info,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
    pageid: i64,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    pageid: i64,
    #[serde(default)]
    extract: String,
}

#[async_trait]
impl DataSource for Wikipedia {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn init(&mut self) -> Result<()> {
        self.config.normalize(DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }

    async fn check_availability(&self) -> bool {
        let deadline = self.config.check_deadline();
        let params = [
            ("action", "query".to_string()),
            ("meta", "siteinfo".to_string()),
            ("format", "json".to_string()),
        ];
        let check = with_deadline(
            deadline,
            "wikipedia availability check",
            self.get_json::<IgnoredAny>(&params, deadline),
        );
        match check.await {
            Ok(_) => true,
            Err(e) => {
                warn!("wikipedia availability check failed: {}", e);
                false
            }
        }
    }

    async fn fetch_topics(&self, limit: usize, query: &str) -> Result<Vec<Topic>> {
        let query = require_query(query, SITE)?;
        let limit = self.config.effective_limit(limit);
        let deadline = self.config.fetch_deadline();
        let params = [
            ("action", "query".to_string()),
            ("list", "search".to_string()),
            ("srsearch", query.to_string()),
            ("srlimit", limit.to_string()),
            ("format", "json".to_string()),
        ];

        let response: SearchResponse = with_deadline(
            deadline,
            "wikipedia fetch_topics",
            self.get_json(&params, deadline),
        )
        .await?;
        if let Some(error) = response.error {
            return Err(error.into_error());
        }

        let hits = response.query.map(|q| q.search).unwrap_or_default();
        hits.into_iter()
            .take(limit)
            .map(|hit| {
                Ok(Topic {
                    title: hit.title,
                    source_url: self.page_url(hit.pageid)?,
                    topic_id: hit.pageid,
                    site: SITE.to_string(),
                })
            })
            .collect()
    }

    async fn fetch_data(&self, _limit: usize, topic_id: i64) -> Result<Vec<TopicData>> {
        if topic_id <= 0 {
            return Err(SearchError::InvalidQuery("topic id is required".into()));
        }
        let deadline = self.config.fetch_deadline();
        let params = [
            ("action", "query".to_string()),
            ("pageids", topic_id.to_string()),
            ("prop", "extracts".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("format", "json".to_string()),
        ];

        let response: ExtractResponse = with_deadline(
            deadline,
            "wikipedia fetch_data",
            self.get_json(&params, deadline),
        )
        .await?;
        if let Some(error) = response.error {
            return Err(error.into_error());
        }

        let Some(mut pages) = response.query.map(|q| q.pages) else {
            return Ok(Vec::new());
        };
        let Some(page) = pages.remove(&topic_id.to_string()) else {
            return Ok(Vec::new());
        };

        let text = page.extract.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let answer_id = if page.pageid > 0 { page.pageid } else { topic_id };
        Ok(vec![TopicData {
            text: text.to_string(),
            source_url: self.page_url(answer_id)?,
            answer_id,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::MockTransport;

    const SEARCH_JSON: &str = r#"{
        "batchcomplete": "",
        "query": {
            "searchinfo": {"totalhits": 2},
            "search": [
                {"ns": 0, "title": "Rust (programming language)", "pageid": 29414838, "snippet": "<span>Rust</span> is"},
                {"ns": 0, "title": "Rust", "pageid": 26477, "snippet": "iron oxide"}
            ]
        }
    }"#;

    const EXTRACT_JSON: &str = r#"{
        "batchcomplete": "",
        "query": {
            "pages": {
                "29414838": {
                    "pageid": 29414838,
                    "ns": 0,
                    "title": "Rust (programming language)",
                    "extract": "  Rust is a general-purpose programming language.\n"
                }
            }
        }
    }"#;

    const ERROR_JSON: &str = r#"{
        "error": {"code": "nosrsearch", "info": "The \"srsearch\" parameter must be set."}
    }"#;

    fn source_with(transport: Arc<MockTransport>) -> Wikipedia {
        let mut source = Wikipedia::new().with_transport(transport);
        source.init().unwrap();
        source
    }

    fn query_pairs(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_wikipedia_new() {
        let source = Wikipedia::new();
        assert_eq!(source.config.name, "Wikipedia");
        assert_eq!(source.config.shortcut, "wiki");
        assert_eq!(source.config.base_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(source.config.user_agent, "locus/ask");
    }

    #[test]
    fn test_wikipedia_default() {
        let source = Wikipedia::default();
        assert_eq!(source.name(), "Wikipedia");
    }

    #[test]
    fn test_wikipedia_with_language() {
        let source = Wikipedia::new().with_language("zh");
        assert_eq!(source.config.base_url, "https://zh.wikipedia.org/w/api.php");
        assert_eq!(
            source.page_url(7).unwrap(),
            "https://zh.wikipedia.org/?curid=7"
        );
    }

    #[test]
    fn test_with_timeout() {
        let mut source = Wikipedia::new().with_timeout(2);
        source.init().unwrap();
        assert_eq!(source.config().fetch_deadline(), Duration::from_secs(2));
    }

    #[test]
    fn test_page_url() {
        let source = Wikipedia::new();
        assert_eq!(
            source.page_url(29414838).unwrap(),
            "https://en.wikipedia.org/?curid=29414838"
        );
    }

    #[tokio::test]
    async fn test_fetch_topics() {
        let transport = Arc::new(MockTransport::new(200, SEARCH_JSON));
        let source = source_with(Arc::clone(&transport));

        let topics = source.fetch_topics(0, " rust ").await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].title, "Rust (programming language)");
        assert_eq!(topics[0].topic_id, 29414838);
        assert_eq!(
            topics[0].source_url,
            "https://en.wikipedia.org/?curid=29414838"
        );
        assert_eq!(topics[0].site, "wikipedia");

        let requests = transport.requests();
        assert_eq!(requests[0].header("Accept"), Some("application/json"));
        let params = query_pairs(&requests[0].url);
        assert_eq!(params["action"], "query");
        assert_eq!(params["list"], "search");
        assert_eq!(params["srsearch"], "rust");
        assert_eq!(params["srlimit"], "5");
        assert_eq!(params["format"], "json");
    }

    #[tokio::test]
    async fn test_fetch_topics_truncates_to_limit() {
        let transport = Arc::new(MockTransport::new(200, SEARCH_JSON));
        let source = source_with(transport);
        let topics = source.fetch_topics(1, "rust").await.unwrap();
        assert_eq!(topics.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_topics_blank_query() {
        let transport = Arc::new(MockTransport::new(200, SEARCH_JSON));
        let source = source_with(Arc::clone(&transport));
        let err = source.fetch_topics(5, "  ").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_topics_no_hits() {
        let transport = Arc::new(MockTransport::new(200, r#"{"query": {"search": []}}"#));
        let source = source_with(transport);
        assert!(source.fetch_topics(5, "zzzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_topics_upstream_error() {
        let transport = Arc::new(MockTransport::new(200, ERROR_JSON));
        let source = source_with(transport);
        let err = source.fetch_topics(5, "rust").await.unwrap_err();
        match err {
            SearchError::Upstream { message, .. } => {
                assert_eq!(message, "The \"srsearch\" parameter must be set.")
            }
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_topics_status_error_carries_body() {
        let transport = Arc::new(MockTransport::new(429, " Too many requests \n"));
        let source = source_with(transport);
        let err = source.fetch_topics(5, "rust").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "wikipedia request failed: status 429: Too many requests"
        );
    }

    #[tokio::test]
    async fn test_fetch_topics_malformed_json() {
        let transport = Arc::new(MockTransport::new(200, "<html>not json</html>"));
        let source = source_with(transport);
        let err = source.fetch_topics(5, "rust").await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_data() {
        let transport = Arc::new(MockTransport::new(200, EXTRACT_JSON));
        let source = source_with(Arc::clone(&transport));

        let data = source.fetch_data(1, 29414838).await.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].text, "Rust is a general-purpose programming language.");
        assert_eq!(data[0].answer_id, 29414838);
        assert_eq!(data[0].source_url, "https://en.wikipedia.org/?curid=29414838");

        let params = query_pairs(&transport.requests()[0].url);
        assert_eq!(params["pageids"], "29414838");
        assert_eq!(params["prop"], "extracts");
        assert_eq!(params["exintro"], "1");
        assert_eq!(params["explaintext"], "1");
    }

    #[tokio::test]
    async fn test_fetch_data_requires_topic_id() {
        let transport = Arc::new(MockTransport::new(200, EXTRACT_JSON));
        let source = source_with(Arc::clone(&transport));
        assert!(matches!(
            source.fetch_data(1, 0).await,
            Err(SearchError::InvalidQuery(_))
        ));
        assert!(matches!(
            source.fetch_data(1, -3).await,
            Err(SearchError::InvalidQuery(_))
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_data_blank_extract() {
        let body = r#"{"query": {"pages": {"5": {"pageid": 5, "extract": "   "}}}}"#;
        let source = source_with(Arc::new(MockTransport::new(200, body)));
        assert!(source.fetch_data(1, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_data_missing_page() {
        let body = r#"{"query": {"pages": {"5": {"pageid": 5, "missing": ""}}}}"#;
        let source = source_with(Arc::new(MockTransport::new(200, body)));
        assert!(source.fetch_data(1, 5).await.unwrap().is_empty());

        let source = source_with(Arc::new(MockTransport::new(200, "{}")));
        assert!(source.fetch_data(1, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_data_upstream_error() {
        let body = r#"{"error": {"code": "badinteger", "info": "Invalid value for pageids."}}"#;
        let source = source_with(Arc::new(MockTransport::new(200, body)));
        let err = source.fetch_data(1, 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_check_availability() {
        let transport = Arc::new(MockTransport::new(200, r#"{"query": {"general": {}}}"#));
        let source = source_with(Arc::clone(&transport));
        assert!(source.check_availability().await);
        let params = query_pairs(&transport.requests()[0].url);
        assert_eq!(params["meta"], "siteinfo");

        let source = source_with(Arc::new(MockTransport::new(200, "not json")));
        assert!(!source.check_availability().await);

        let source = source_with(Arc::new(MockTransport::new(503, "")));
        assert!(!source.check_availability().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_data_timeout() {
        let transport =
            Arc::new(MockTransport::new(200, EXTRACT_JSON).with_delay(Duration::from_secs(60)));
        let source = source_with(transport);
        let err = source.fetch_data(1, 29414838).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout(_)));
    }
}
