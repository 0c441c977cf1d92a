//! Host-filtered scan over every link, for pages whose result markup has drifted.

use tracing::debug;

use super::{Extractor, RawCandidate, SeenSet};
use crate::document::SearchDocument;
use crate::topic::normalize_whitespace;
use crate::{Result, Topic};

/// Reduces a host filter to a bare, lowercase host suffix.
///
/// Accepts either `example.com` or `site:example.com`; returns `None` when
/// nothing is left.
pub fn host_suffix(filter: &str) -> Option<String> {
    let filter = filter.trim();
    let filter = filter.strip_prefix("site:").unwrap_or(filter).trim();
    if filter.is_empty() {
        return None;
    }
    Some(filter.to_ascii_lowercase())
}

impl Extractor {
    /// Collects up to `limit` topics from every link whose host ends with the
    /// filter's host suffix.
    ///
    /// Without a usable filter this returns an empty vector: an unfiltered scan
    /// would surface navigation and footer links. Links already in `seen` are
    /// skipped, and a link with no text is titled with its own URL.
    pub fn select_fallback<D: SearchDocument>(
        &self,
        doc: &D,
        limit: usize,
        host_filter: Option<&str>,
        seen: &mut SeenSet,
    ) -> Result<Vec<Topic>> {
        let Some(suffix) = host_filter.and_then(host_suffix) else {
            return Ok(Vec::new());
        };

        let nodes = doc.select(self.rules.fallback_selector)?;
        debug!(site = %self.site, links = nodes.len(), %suffix, "fallback scan");

        let mut topics = Vec::new();
        for node in &nodes {
            if topics.len() >= limit {
                break;
            }
            let candidate = RawCandidate::from_node(node);
            let Some(url) = self.normalizer.normalize_url(&candidate.raw_href) else {
                continue;
            };
            if !url.host_str().is_some_and(|host| host.ends_with(&suffix)) {
                continue;
            }
            let url = String::from(url);
            if seen.contains(&url) {
                continue;
            }
            seen.insert(url.clone());

            let mut title = normalize_whitespace(&candidate.display_text);
            if title.is_empty() {
                title = url.clone();
            }
            topics.push(Topic::from_url(title, url, &self.site));
        }
        Ok(topics)
    }
}
