//! Targeted-selector extraction.

use tracing::debug;

use super::{Extractor, RawCandidate, SeenSet};
use crate::document::SearchDocument;
use crate::topic::normalize_whitespace;
use crate::{Result, Topic};

impl Extractor {
    /// Collects up to `limit` topics from nodes matching the primary selector.
    ///
    /// Nodes are visited in document order. A node is skipped when its text is
    /// blank, its link does not normalize, or the link was already emitted.
    pub fn select_primary<D: SearchDocument>(
        &self,
        doc: &D,
        limit: usize,
        seen: &mut SeenSet,
    ) -> Result<Vec<Topic>> {
        let nodes = doc.select(self.rules.primary_selector)?;
        debug!(site = %self.site, matches = nodes.len(), "primary selector matches");

        let mut topics = Vec::with_capacity(limit.min(nodes.len()));
        for node in &nodes {
            if topics.len() >= limit {
                break;
            }
            let candidate = RawCandidate::from_node(node);
            let title = normalize_whitespace(&candidate.display_text);
            if title.is_empty() {
                continue;
            }
            let Some(url) = self.normalizer.normalize(&candidate.raw_href) else {
                continue;
            };
            if seen.contains(&url) {
                continue;
            }
            seen.insert(url.clone());
            topics.push(Topic::from_url(title, url, &self.site));
        }
        Ok(topics)
    }
}
