//! Statistics gathered from the event stream
//!
//! This module accumulates counters while events are consumed and prints a short
//! summary once the crawl is over.

use crate::events::{CrawlEvent, EventKind};
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Crawled domain
    pub domain: Option<String>,

    /// Number of `PageVisited` events
    pub pages_visited: u64,

    /// Visited pages whose fetch failed
    pub pages_failed: u64,

    /// Same-domain links found, summed over pages
    pub links_discovered: u64,

    /// Visited count reported by `CrawlEnded`
    pub visited_count: Option<usize>,

    /// Error of an `InvalidArgument` event
    pub invalid_argument: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the counters
    pub fn record(&mut self, event: &CrawlEvent) {
        match event.kind() {
            EventKind::InvalidArgument { error, .. } => {
                self.invalid_argument = Some(error.clone());
                self.ended_at = Some(event.when());
            }
            EventKind::CrawlStarted => {
                self.domain = Some(event.id().to_string());
                self.started_at = Some(event.when());
            }
            EventKind::PageVisited(page) => {
                self.pages_visited += 1;
                if page.is_success() {
                    self.links_discovered += page.link_count() as u64;
                } else {
                    self.pages_failed += 1;
                }
            }
            EventKind::CrawlEnded { visited_count } => {
                self.visited_count = Some(*visited_count);
                self.ended_at = Some(event.when());
            }
        }
    }

    /// Time between `CrawlStarted` and `CrawlEnded`
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.ended_at? - self.started_at?)
    }

    /// Share of visited pages fetched successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        let succeeded = self.pages_visited - self.pages_failed;
        (succeeded as f64 / self.pages_visited as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("\n=== Crawl Statistics ===\n");

    if let Some(error) = &stats.invalid_argument {
        println!("Crawl did not start: {}", error);
        return;
    }

    if let Some(domain) = &stats.domain {
        println!("Domain: {}", domain);
    }
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Links discovered: {}", stats.links_discovered);
    if let Some(duration) = stats.duration() {
        println!("  Duration: {:.3}s", duration.num_milliseconds() as f64 / 1000.0);
    }

    println!(
        "\nSuccess Rate: {:.1}% ({} / {} pages fetched successfully)",
        stats.success_rate(),
        stats.pages_visited - stats.pages_failed,
        stats.pages_visited
    );
}
