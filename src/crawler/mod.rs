//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of single pages
//! - HTML parsing and link extraction
//! - Frontier and visited-set scheduling
//! - Overall crawl coordination and event emission

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Spider;
pub use fetcher::{build_http_client, LinkMap, PageFetcher, PageResult};
pub use parser::{extract_links, parse_html, start_tags, HrefExtractor, LinkExtractor};
pub use scheduler::{Batch, Scheduler};

use crate::config::CrawlConfig;
use crate::events::CrawlEvent;
use crate::SpiderError;
use tokio::sync::mpsc;

/// Runs a complete crawl of one domain
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL (or report `InvalidArgument` and stop)
/// 2. Build the HTTP client
/// 3. Fetch the frontier in batches of at most `config.concurrency` pages
/// 4. Follow same-domain links until the frontier is empty
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
/// * `events` - Where events are sent; the caller must drain the receiver
///
/// # Returns
///
/// * `Ok(usize)` - Number of distinct URLs visited
/// * `Err(SpiderError)` - The HTTP client could not be built
pub async fn crawl(
    config: CrawlConfig,
    seed: &str,
    events: mpsc::Sender<CrawlEvent>,
) -> Result<usize, SpiderError> {
    Spider::new(config, events).crawl(seed).await
}
