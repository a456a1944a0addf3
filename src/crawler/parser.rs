//! HTML link extraction
//!
//! A parsed document is walked as a stream of start-tag tokens in document order, and
//! a [`LinkExtractor`] picks the raw link values out of that stream. Nothing here
//! resolves or filters links, that happens in [`crate::url`].

use scraper::node::Element;
use scraper::Html;

/// Picks raw links out of start-tag tokens
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw link carried by `element`, or `None` if the token has none
    fn filter_map<'a>(&self, element: &'a Element) -> Option<&'a str>;
}

/// Extracts the `href` attribute of anchor elements
///
/// Every other element and attribute is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HrefExtractor;

impl LinkExtractor for HrefExtractor {
    fn filter_map<'a>(&self, element: &'a Element) -> Option<&'a str> {
        if element.name() != "a" {
            return None;
        }
        element.attr("href")
    }
}

/// Parses a page body into a document
///
/// The HTML parser is error tolerant, so any body yields a document.
pub fn parse_html(body: &str) -> Html {
    Html::parse_document(body)
}

/// Lazily yields the start-tag tokens of a document in document order
pub fn start_tags(document: &Html) -> impl Iterator<Item = &Element> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
}

/// Lazily yields the raw links the extractor finds in a document
///
/// # Example
///
/// ```
/// use spider_crawl::crawler::{extract_links, parse_html, HrefExtractor};
///
/// let document = parse_html(r#"<p><a href="/about">About</a><img src="/logo.png"></p>"#);
/// let links: Vec<&str> = extract_links(&HrefExtractor, &document).collect();
/// assert_eq!(links, vec!["/about"]);
/// ```
pub fn extract_links<'a, E>(extractor: &'a E, document: &'a Html) -> impl Iterator<Item = &'a str>
where
    E: LinkExtractor + ?Sized,
{
    start_tags(document).filter_map(move |element| extractor.filter_map(element))
}
