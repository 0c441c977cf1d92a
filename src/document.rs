//! Queryable HTML documents.
//!
//! Extraction only needs three capabilities from a parsed page: find nodes
//! matching a CSS selector, read an attribute, and read the text content.
//! [`SearchDocument`] and [`DocumentNode`] expose exactly that, with
//! [`HtmlDocument`] as the `scraper`-backed implementation.

use scraper::{ElementRef, Html, Selector};

use crate::{Result, SearchError};

/// A node returned by a selector query.
pub trait DocumentNode {
    /// Concatenated text of the node and its descendants.
    fn text(&self) -> String;

    /// Value of attribute `name`, if present.
    fn attr(&self, name: &str) -> Option<&str>;
}

/// A read-only parsed document.
pub trait SearchDocument {
    /// Node handle borrowed from the document.
    type Node<'a>: DocumentNode
    where
        Self: 'a;

    /// Returns every node matching `selector`, in document order.
    fn select<'a>(&'a self, selector: &str) -> Result<Vec<Self::Node<'a>>>;

    /// Returns the trimmed `<title>` text, if any.
    fn title(&self) -> Option<String> {
        self.select("title")
            .ok()?
            .first()
            .map(|node| node.text().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

/// An HTML document parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses an HTML body.
    ///
    /// The HTML parser recovers from malformed markup, so the only rejected input
    /// is a body with no content at all.
    pub fn parse(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(SearchError::Parse("empty HTML document".into()));
        }
        Ok(Self {
            html: Html::parse_document(body),
        })
    }
}

/// An element of an [`HtmlDocument`].
#[derive(Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

impl DocumentNode for HtmlNode<'_> {
    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }
}

impl SearchDocument for HtmlDocument {
    type Node<'a> = HtmlNode<'a>;

    fn select<'a>(&'a self, selector: &str) -> Result<Vec<HtmlNode<'a>>> {
        let selector = Selector::parse(selector)
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        Ok(self.html.select(&selector).map(HtmlNode).collect())
    }
}
