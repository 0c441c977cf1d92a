//! # locus-search
//!
//! Topic data sources that turn a free-text query into a ranked list of topics
//! (title, canonical URL, stable identifier), whatever the backend looks like.
//!
//! - A DuckDuckGo source that scrapes the HTML results page, unwrapping redirect
//!   links, dropping advertisements and falling back to a host-filtered link
//!   scan when the result markup changes
//! - A Wikipedia source built on the MediaWiki API, with detail expansion
//! - A common [`DataSource`] contract and a [`Registry`] to host sources
//! - Pluggable [`transport::Transport`] and [`document::SearchDocument`] seams
//!
//! ## Example
//!
//! ```rust,no_run
//! use locus_search::{sources::DuckDuckGo, DataSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut source = DuckDuckGo::new().with_site_filter("docs.rs");
//!     source.init()?;
//!
//!     for topic in source.fetch_topics(5, "serde derive").await? {
//!         println!("{} [{}]: {}", topic.title, topic.topic_id, topic.source_url);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod registry;
mod source;
mod topic;

pub mod document;
pub mod extract;
pub mod sources;
pub mod transport;
pub mod transport_http;

pub use error::{Result, SearchError};
pub use registry::Registry;
pub use source::{DataSource, SourceConfig, DEFAULT_LIMIT};
pub use topic::{normalize_whitespace, url_to_id, Topic, TopicData};
