use serde::Deserialize;
use std::time::Duration;

/// Default URL to crawl
pub const DEFAULT_SEED: &str = "https://monzo.com/";

/// Default maximum number of URLs fetched concurrently
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default capacity of the event channel
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Main configuration structure for Spider-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// URL the crawl starts from
    #[serde(default)]
    pub seed: Option<String>,

    #[serde(default)]
    pub crawler: CrawlConfig,
}

impl Config {
    /// The configured seed, or [`DEFAULT_SEED`]
    pub fn seed_or_default(&self) -> &str {
        self.seed.as_deref().unwrap_or(DEFAULT_SEED)
    }
}

/// Crawler behavior configuration
///
/// Fixed for the lifetime of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of simultaneous in-flight fetches
    pub concurrency: usize,

    /// Per-fetch timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Capacity of the event channel
    #[serde(rename = "event-buffer")]
    pub event_buffer: usize,
}

impl CrawlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("spider-crawl/{}", env!("CARGO_PKG_VERSION")),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}
