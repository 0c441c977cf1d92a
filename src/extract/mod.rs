//! Search-result extraction from HTML result pages.
//!
//! Extraction runs a targeted selector first ([`Extractor::select_primary`]) and,
//! when that yields nothing and a host filter is configured, a broad scan of
//! every link restricted to the filtered host ([`Extractor::select_fallback`]).
//! Both strategies share one [`SeenSet`] per call, preserve document order and
//! stop at the requested limit.

mod fallback;
mod normalize;
mod primary;

use std::collections::HashSet;

use tracing::debug;
use url::Url;

use crate::document::{DocumentNode, SearchDocument};
use crate::{Result, Topic};

pub use fallback::host_suffix;
pub use normalize::{LinkRules, UrlNormalizer};

/// Canonical URLs already emitted during one extraction call.
pub type SeenSet = HashSet<String>;

/// Selectors and link conventions of one search engine's result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRules {
    /// Selector matching result title links.
    pub primary_selector: &'static str,
    /// Selector matching every candidate link for the fallback scan.
    pub fallback_selector: &'static str,
    /// Redirect and advertisement conventions.
    pub links: LinkRules,
}

impl ExtractionRules {
    /// Rules for the DuckDuckGo HTML endpoint.
    ///
    /// The primary selector lists several class patterns because the markup
    /// varies between page revisions.
    pub const DUCKDUCKGO: ExtractionRules = ExtractionRules {
        primary_selector: "a.result__a, a.result__a.js-result-title-link, a.result__url",
        fallback_selector: "a[href]",
        links: LinkRules::DUCKDUCKGO,
    };
}

/// Display text and href read from one document node.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawCandidate {
    display_text: String,
    raw_href: String,
}

impl RawCandidate {
    fn from_node<N: DocumentNode>(node: &N) -> Self {
        Self {
            display_text: node.text(),
            raw_href: node.attr("href").unwrap_or_default().trim().to_string(),
        }
    }
}

/// Extracts topics from result pages of one engine.
#[derive(Debug, Clone)]
pub struct Extractor {
    normalizer: UrlNormalizer,
    rules: ExtractionRules,
    site: String,
}

impl Extractor {
    /// Creates an extractor resolving links against `base` and tagging topics with `site`.
    pub fn new(base: Url, rules: ExtractionRules, site: impl Into<String>) -> Self {
        Self {
            normalizer: UrlNormalizer::new(base, rules.links),
            rules,
            site: site.into(),
        }
    }

    /// Returns the link normalizer.
    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    /// Runs the primary strategy, then the fallback scan if nothing was found.
    pub fn extract<D: SearchDocument>(
        &self,
        doc: &D,
        limit: usize,
        host_filter: Option<&str>,
    ) -> Result<Vec<Topic>> {
        let mut seen = SeenSet::new();
        let topics = self.select_primary(doc, limit, &mut seen)?;
        if !topics.is_empty() {
            return Ok(topics);
        }

        let topics = self.select_fallback(doc, limit, host_filter, &mut seen)?;
        debug!(site = %self.site, count = topics.len(), "fallback results");
        Ok(topics)
    }
}
