//! Registry of initialized data sources.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::{DataSource, Result, SearchError};

/// Holds initialized data sources, looked up by shortcut.
#[derive(Default)]
pub struct Registry {
    sources: Vec<Arc<dyn DataSource>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes `source` and adds it.
    ///
    /// Fails if initialization fails or the shortcut is already taken.
    pub fn register<S: DataSource + 'static>(&mut self, mut source: S) -> Result<()> {
        source.init()?;
        if self.get(source.shortcut()).is_some() {
            return Err(SearchError::Config(format!(
                "source '{}' is already registered",
                source.shortcut()
            )));
        }
        debug!("Registered source {} ({})", source.name(), source.shortcut());
        self.sources.push(Arc::new(source));
        Ok(())
    }

    /// Returns the source registered under `shortcut`.
    pub fn get(&self, shortcut: &str) -> Option<Arc<dyn DataSource>> {
        self.sources
            .iter()
            .find(|source| source.shortcut() == shortcut)
            .cloned()
    }

    /// Returns every registered shortcut in registration order.
    pub fn shortcuts(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.shortcut()).collect()
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true when no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Checks every enabled source concurrently.
    pub async fn check_all(&self) -> Vec<(String, bool)> {
        let checks = self
            .sources
            .iter()
            .filter(|source| source.is_enabled())
            .map(|source| {
                let source = Arc::clone(source);
                async move {
                    let available = source.check_availability().await;
                    debug!("Source {} available: {}", source.name(), available);
                    (source.shortcut().to_string(), available)
                }
            });
        join_all(checks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::sources::mock::MockTransport;
    use crate::sources::DuckDuckGo;
    use crate::{SourceConfig, Topic, TopicData};
    use async_trait::async_trait;

    struct MockSource {
        config: SourceConfig,
        available: bool,
        fail_init: bool,
    }

    impl MockSource {
        fn new(shortcut: &str, available: bool) -> Self {
            Self {
                config: SourceConfig {
                    name: format!("Mock {}", shortcut),
                    shortcut: shortcut.to_string(),
                    base_url: "https://mock.example/".to_string(),
                    ..Default::default()
                },
                available,
                fail_init: false,
            }
        }
    }

    #[async_trait]
    impl DataSource for MockSource {
        fn config(&self) -> &SourceConfig {
            &self.config
        }

        fn init(&mut self) -> Result<()> {
            if self.fail_init {
                return Err(SearchError::Config("broken".to_string()));
            }
            self.config.normalize("https://mock.example/", "mock")
        }

        async fn check_availability(&self) -> bool {
            self.available
        }

        async fn fetch_topics(&self, _limit: usize, query: &str) -> Result<Vec<Topic>> {
            Ok(vec![Topic::from_url(query, "https://mock.example/a", "mock")])
        }

        async fn fetch_data(&self, _limit: usize, _topic_id: i64) -> Result<Vec<TopicData>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_registry_new() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = Registry::new();
        registry.register(MockSource::new("a", true)).unwrap();
        registry.register(MockSource::new("b", false)).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.shortcuts(), vec!["a", "b"]);
        assert_eq!(registry.get("b").unwrap().name(), "Mock b");
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = Registry::new();
        registry.register(MockSource::new("a", true)).unwrap();
        let err = registry.register(MockSource::new("a", true)).unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_propagates_init_failure() {
        let mut registry = Registry::new();
        let mut source = MockSource::new("a", true);
        source.fail_init = true;
        assert!(matches!(
            registry.register(source),
            Err(SearchError::Config(_))
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_registry_check_all() {
        let mut registry = Registry::new();
        registry.register(MockSource::new("up", true)).unwrap();
        registry.register(MockSource::new("down", false)).unwrap();
        let mut disabled = MockSource::new("off", true);
        disabled.config.enabled = false;
        registry.register(disabled).unwrap();

        let results = registry.check_all().await;
        assert_eq!(
            results,
            vec![("up".to_string(), true), ("down".to_string(), false)]
        );
    }

    const DUPLICATED_HTML: &str = r#"<html><body>
        <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fserde.rs%2F">Serde</a>
        <a class="result__url" href="https://serde.rs/">serde.rs</a>
        <a class="result__a" href="https://docs.rs/serde">serde - Rust</a>
        <a class="result__a" href="https://docs.rs/serde">serde - Rust (again)</a>
        <a class="result__a" href="https://github.com/serde-rs/serde">serde-rs/serde</a>
    </body></html>"#;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registry_source_is_usable_concurrently() {
        let transport = Arc::new(
            MockTransport::new(200, DUPLICATED_HTML).with_delay(Duration::from_millis(20)),
        );
        let mut registry = Registry::new();
        registry
            .register(DuckDuckGo::new().with_transport(transport.clone()))
            .unwrap();
        let source = registry.get("ddg").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let source = Arc::clone(&source);
                tokio::spawn(async move { source.fetch_topics(10, &format!("serde {}", i)).await })
            })
            .collect();

        for handle in handles {
            let urls: Vec<_> = handle
                .await
                .unwrap()
                .unwrap()
                .into_iter()
                .map(|topic| topic.source_url)
                .collect();
            // Every call dedups on its own, unaffected by the others.
            assert_eq!(
                urls,
                vec![
                    "https://serde.rs/",
                    "https://docs.rs/serde",
                    "https://github.com/serde-rs/serde",
                ]
            );
        }
        assert_eq!(transport.requests().len(), 8);
    }
}
