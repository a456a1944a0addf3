//! Plain-text rendering of crawl events

use crate::events::{CrawlEvent, EventKind};
use crate::url::canonical_key;
use std::fmt::Write;

/// Renders one event as text
///
/// Visited pages list their same-domain links below them, one per tab-indented line,
/// in sorted order. URLs are shown percent-decoded.
///
/// # Example
///
/// ```
/// use spider_crawl::events::{CrawlEvent, EventKind};
/// use spider_crawl::output::render_event;
///
/// let event = CrawlEvent::new("example.com", EventKind::CrawlEnded { visited_count: 3 });
/// assert!(render_event(&event).ends_with("Crawling 'example.com' ended! Visited 3 unique URLs"));
/// ```
pub fn render_event(event: &CrawlEvent) -> String {
    let when = event.when().timestamp();
    let id = event.id();

    match event.kind() {
        EventKind::InvalidArgument { error, .. } => {
            format!("[{}] Crawling '{}' invalid arg: {}", when, id, error)
        }
        EventKind::CrawlStarted => format!("[{}] Crawling '{}' started", when, id),
        EventKind::PageVisited(page) => {
            let mut out = format!("[{}] Visited '{}'", when, canonical_key(&page.url));
            if let Some(error) = &page.error {
                let _ = write!(out, "\n\terror: {}", error);
            }
            if let Some(links) = &page.links {
                for key in links.keys() {
                    let _ = write!(out, "\n\t{}", key);
                }
            }
            out
        }
        EventKind::CrawlEnded { visited_count } => format!(
            "[{}] Crawling '{}' ended! Visited {} unique URLs",
            when, id, visited_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{LinkMap, PageResult};
    use crate::SpiderError;
    use url::Url;

    #[test]
    fn test_render_started() {
        let event = CrawlEvent::new("example.com", EventKind::CrawlStarted);
        let expected = format!("[{}] Crawling 'example.com' started", event.when().timestamp());
        assert_eq!(render_event(&event), expected);
    }

    #[test]
    fn test_render_invalid_argument() {
        let event = CrawlEvent::new(
            "nope",
            EventKind::InvalidArgument {
                raw_url: "nope".to_string(),
                error: "the given URL 'nope' is not valid".to_string(),
            },
        );
        assert!(render_event(&event)
            .ends_with("Crawling 'nope' invalid arg: the given URL 'nope' is not valid"));
    }

    #[test]
    fn test_render_visited_with_links() {
        let mut links = LinkMap::new();
        for path in ["/b", "/a%20c"] {
            let url = Url::parse(&format!("https://example.com{}", path)).unwrap();
            links.insert(canonical_key(&url), url);
        }
        let page = PageResult::success(Url::parse("https://example.com/caf%C3%A9").unwrap(), links);
        let event = CrawlEvent::new("example.com", EventKind::PageVisited(page));

        let rendered = render_event(&event);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].ends_with("Visited 'https://example.com/café'"));
        assert_eq!(lines[1], "\thttps://example.com/a c");
        assert_eq!(lines[2], "\thttps://example.com/b");
    }

    #[test]
    fn test_render_visited_with_error() {
        let url = Url::parse("https://example.com/missing").unwrap();
        let page = PageResult::failure(
            url.clone(),
            SpiderError::Status {
                url: url.to_string(),
                status_code: 404,
            },
        );
        let event = CrawlEvent::new("example.com", EventKind::PageVisited(page));

        let rendered = render_event(&event);
        assert_eq!(rendered.lines().nth(1), Some("\terror: status code: 404"));
    }
}
