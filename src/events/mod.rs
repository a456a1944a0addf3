//! Events emitted by a crawl
//!
//! A crawl reports to its observer through an ordered stream of [`CrawlEvent`]s. A
//! successful crawl emits `CrawlStarted`, one `PageVisited` per fetched URL, then
//! `CrawlEnded`. A crawl whose seed URL is invalid emits a single `InvalidArgument`.

use crate::crawler::PageResult;
use chrono::{DateTime, Utc};

/// One crawl event, tagged with the crawled domain and the emission time
#[derive(Debug)]
pub struct CrawlEvent {
    id: String,
    when: DateTime<Utc>,
    kind: EventKind,
}

/// What happened
#[derive(Debug)]
pub enum EventKind {
    /// The seed URL could not be parsed; nothing was crawled
    InvalidArgument { raw_url: String, error: String },

    /// The crawl began
    CrawlStarted,

    /// One fetch completed, successfully or not
    PageVisited(PageResult),

    /// The frontier is exhausted
    CrawlEnded { visited_count: usize },
}

impl CrawlEvent {
    /// Creates an event stamped with the current time
    pub fn new(id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            when: Utc::now(),
            kind,
        }
    }

    /// The domain being crawled, or the raw seed for `InvalidArgument`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Returns true for the last event a crawl emits
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::InvalidArgument { .. } | EventKind::CrawlEnded { .. }
        )
    }
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::CrawlStarted => "crawl_started",
            Self::PageVisited(_) => "page_visited",
            Self::CrawlEnded { .. } => "crawl_ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_event_carries_id_and_time() {
        let before = Utc::now();
        let event = CrawlEvent::new("example.com", EventKind::CrawlStarted);
        assert_eq!(event.id(), "example.com");
        assert!(event.when() >= before);
        assert!(event.when() <= Utc::now());
    }

    #[test]
    fn test_is_terminal() {
        let page = PageResult::success(
            Url::parse("https://example.com/").unwrap(),
            Default::default(),
        );

        assert!(!CrawlEvent::new("x", EventKind::CrawlStarted).is_terminal());
        assert!(!CrawlEvent::new("x", EventKind::PageVisited(page)).is_terminal());
        assert!(CrawlEvent::new("x", EventKind::CrawlEnded { visited_count: 1 }).is_terminal());
        assert!(CrawlEvent::new(
            "x",
            EventKind::InvalidArgument {
                raw_url: "x".to_string(),
                error: "bad".to_string(),
            }
        )
        .is_terminal());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(EventKind::CrawlStarted.name(), "crawl_started");
        assert_eq!(
            EventKind::CrawlEnded { visited_count: 0 }.name(),
            "crawl_ended"
        );
    }
}
