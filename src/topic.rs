//! Topic and detail record types shared by every data source.

use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A normalized search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Display title, whitespace-collapsed and never empty.
    pub title: String,
    /// Absolute canonical URL of the result.
    pub source_url: String,
    /// Stable identifier of the topic within its source.
    pub topic_id: i64,
    /// Tag of the source that produced this topic.
    pub site: String,
}

impl Topic {
    /// Creates a topic whose identifier is derived from its URL.
    pub fn from_url(
        title: impl Into<String>,
        source_url: impl Into<String>,
        site: impl Into<String>,
    ) -> Self {
        let source_url = source_url.into();
        Self {
            title: title.into(),
            topic_id: url_to_id(&source_url),
            source_url,
            site: site.into(),
        }
    }
}

/// Detailed content expanded from a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicData {
    /// Plain-text body of the detail record.
    pub text: String,
    /// URL the text was taken from.
    pub source_url: String,
    /// Identifier of the topic this record answers.
    pub answer_id: i64,
}

/// Derives a stable identifier from a canonical URL.
///
/// FNV-1a 64 over the UTF-8 bytes, reinterpreted as a signed integer. The
/// algorithm is pinned: identifiers must match across runs and across every
/// source that synthesizes ids from URLs.
pub fn url_to_id(url: &str) -> i64 {
    let hash = url.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    hash as i64
}

/// Trims and collapses internal whitespace runs to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
