//! HTTP fetcher implementation
//!
//! This module handles the single request made for every crawled page:
//! - Building the HTTP client shared by a crawl
//! - Fetching a page exactly once (no retries)
//! - Extracting and filtering the links found in the body
//! - Reporting the outcome as a [`PageResult`]

use crate::config::CrawlConfig;
use crate::crawler::parser::{extract_links, parse_html, HrefExtractor, LinkExtractor};
use crate::url::{canonical_key, SameDomainFilter, UrlFilter};
use crate::SpiderError;
use reqwest::Client;
use std::collections::BTreeMap;
use url::Url;

/// Same-domain links found on a page, keyed by canonical URL string
pub type LinkMap = BTreeMap<String, Url>;

/// Outcome of fetching one page
///
/// Exactly one of `links` and `error` is set.
#[derive(Debug)]
pub struct PageResult {
    /// The fetched URL
    pub url: Url,

    /// Same-domain links discovered on the page
    pub links: Option<LinkMap>,

    /// Why the fetch failed
    pub error: Option<SpiderError>,
}

impl PageResult {
    pub fn success(url: Url, links: LinkMap) -> Self {
        Self {
            url,
            links: Some(links),
            error: None,
        }
    }

    pub fn failure(url: Url, error: SpiderError) -> Self {
        Self {
            url,
            links: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Number of links discovered, zero for failed pages
    pub fn link_count(&self) -> usize {
        self.links.as_ref().map_or(0, BTreeMap::len)
    }
}

/// Builds the HTTP client used for every fetch of a crawl
///
/// # Arguments
///
/// * `config` - The crawl configuration (timeout and user agent)
///
/// # Example
///
/// ```
/// use spider_crawl::config::CrawlConfig;
/// use spider_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages of a single domain
///
/// The link extraction and filtering strategies are type parameters so that other
/// crawl policies can be plugged in without touching the scheduler.
pub struct PageFetcher<E = HrefExtractor, F = SameDomainFilter> {
    client: Client,
    root: Url,
    extractor: E,
    filter: F,
}

impl PageFetcher {
    /// Creates a fetcher following `<a href>` links on the root's host
    pub fn new(client: Client, root: Url) -> Self {
        Self::with_strategies(client, root, HrefExtractor, SameDomainFilter)
    }
}

impl<E: LinkExtractor, F: UrlFilter> PageFetcher<E, F> {
    pub fn with_strategies(client: Client, root: Url, extractor: E, filter: F) -> Self {
        Self {
            client,
            root,
            extractor,
            filter,
        }
    }

    /// Fetches `url` once and collects the links it contains
    ///
    /// # Failure Cases
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Connection, TLS, timeout | `SpiderError::Http` |
    /// | Non-2xx status | `SpiderError::Status` carrying the code |
    /// | Body read error | `SpiderError::Http` |
    ///
    /// Links that fail decoding, resolution or filtering are dropped silently and
    /// never fail the page.
    pub async fn fetch(&self, url: Url) -> PageResult {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(source) => {
                let error = SpiderError::Http {
                    url: url.to_string(),
                    source,
                };
                return PageResult::failure(url, error);
            }
        };

        let status = response.status();
        if !status.is_success() {
            // dropping the response releases the connection
            drop(response);
            let error = SpiderError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            };
            return PageResult::failure(url, error);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                let error = SpiderError::Http {
                    url: url.to_string(),
                    source,
                };
                return PageResult::failure(url, error);
            }
        };

        let links = self.collect_links(&url, &String::from_utf8_lossy(&body));
        tracing::debug!("Fetched {} ({} links)", url, links.len());

        PageResult::success(url, links)
    }

    /// Runs every extracted link through the filter, keyed by canonical string
    pub fn collect_links(&self, parent: &Url, body: &str) -> LinkMap {
        let document = parse_html(body);
        let mut links = LinkMap::new();

        for raw in extract_links(&self.extractor, &document) {
            match self.filter.filter_map(&self.root, parent, raw) {
                Ok(url) => {
                    links.insert(canonical_key(&url), url);
                }
                Err(e) => tracing::trace!("Dropped link {:?} on {}: {}", raw, parent, e),
            }
        }

        links
    }
}
