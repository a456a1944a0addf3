//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop, which:
//! - Validates the seed URL and drives the crawl state machine
//! - Cuts bounded batches off the frontier and fetches them concurrently
//! - Waits for the whole batch before touching the frontier again
//! - Reports every step on the event channel

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{build_http_client, PageFetcher, PageResult};
use crate::crawler::parser::{HrefExtractor, LinkExtractor};
use crate::crawler::scheduler::Scheduler;
use crate::events::{CrawlEvent, EventKind};
use crate::state::CrawlState;
use crate::url::{extract_host, parse_seed, SameDomainFilter, UrlFilter};
use crate::SpiderError;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// Crawls a single domain and reports progress as events
///
/// The link extraction and filtering strategies default to `<a href>` links on the
/// seed's exact host.
pub struct Spider<E = HrefExtractor, F = SameDomainFilter> {
    config: CrawlConfig,
    events: mpsc::Sender<CrawlEvent>,
    extractor: E,
    filter: F,
}

impl Spider {
    /// Creates a spider sending its events on `events`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use spider_crawl::config::CrawlConfig;
    /// use spider_crawl::crawler::Spider;
    /// use tokio::sync::mpsc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let (tx, mut rx) = mpsc::channel(64);
    /// let spider = Spider::new(CrawlConfig::default(), tx);
    /// let crawl = tokio::spawn(async move { spider.crawl("https://example.com/").await });
    ///
    /// while let Some(event) = rx.recv().await {
    ///     println!("{} {}", event.id(), event.kind().name());
    /// }
    /// let visited = crawl.await??;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: CrawlConfig, events: mpsc::Sender<CrawlEvent>) -> Self {
        Self::with_strategies(config, events, HrefExtractor, SameDomainFilter)
    }
}

impl<E, F> Spider<E, F>
where
    E: LinkExtractor + Clone + 'static,
    F: UrlFilter + Clone + 'static,
{
    pub fn with_strategies(
        config: CrawlConfig,
        events: mpsc::Sender<CrawlEvent>,
        extractor: E,
        filter: F,
    ) -> Self {
        Self {
            config,
            events,
            extractor,
            filter,
        }
    }

    /// Crawls every page reachable from `raw_url` on the same host
    ///
    /// Emits `CrawlStarted`, one `PageVisited` per fetched URL and `CrawlEnded`, then
    /// returns the number of distinct URLs visited. An unparseable seed emits a single
    /// `InvalidArgument` and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built. Fetch errors are reported in
    /// `PageVisited` events and never abort the crawl.
    pub async fn crawl(&self, raw_url: &str) -> Result<usize, SpiderError> {
        let state = CrawlState::NotStarted;

        let root = match parse_seed(raw_url) {
            Ok(root) => root,
            Err(e) => {
                state.transition(CrawlState::Ended)?;
                let error = format!("the given URL '{}' is not valid: {}", raw_url, e);
                tracing::warn!("{}", error);
                let mut emitter = Emitter::new(&self.events, raw_url.to_string());
                emitter
                    .emit(EventKind::InvalidArgument {
                        raw_url: raw_url.to_string(),
                        error,
                    })
                    .await;
                return Ok(0);
            }
        };

        let client = build_http_client(&self.config).map_err(|source| SpiderError::Http {
            url: root.to_string(),
            source,
        })?;
        let fetcher = Arc::new(PageFetcher::with_strategies(
            client,
            root.clone(),
            self.extractor.clone(),
            self.filter.clone(),
        ));

        let domain = extract_host(&root).unwrap_or_default();
        let mut emitter = Emitter::new(&self.events, domain.clone());

        let state = state.transition(CrawlState::Running)?;
        tracing::info!(
            "Crawling {} (concurrency {}, timeout {:?})",
            root,
            self.config.concurrency,
            self.config.timeout()
        );
        emitter.emit(EventKind::CrawlStarted).await;

        let visited_count = self.run(root, fetcher, &mut emitter).await;

        state.transition(CrawlState::Ended)?;
        tracing::info!("Crawl of {} ended: {} unique URLs visited", domain, visited_count);
        emitter.emit(EventKind::CrawlEnded { visited_count }).await;

        Ok(visited_count)
    }

    /// Runs batches until the frontier is exhausted
    ///
    /// Returns the visited count.
    async fn run(
        &self,
        root: Url,
        fetcher: Arc<PageFetcher<E, F>>,
        emitter: &mut Emitter<'_>,
    ) -> usize {
        let concurrency = self.config.concurrency.max(1);
        let mut scheduler = Scheduler::new(root, concurrency);
        let (page_tx, mut page_rx) = mpsc::channel::<PageResult>(concurrency);

        while let Some(mut batch) = scheduler.next_batch() {
            tracing::debug!(
                "Dispatching {} URLs ({} in frontier, {} visited)",
                batch.urls().len(),
                scheduler.frontier_size(),
                scheduler.visited_count()
            );

            for url in batch.urls() {
                dispatch(Arc::clone(&fetcher), url.clone(), page_tx.clone());
            }

            for _ in 0..batch.urls().len() {
                // page_tx is held here, so recv only yields None if every task vanished
                let Some(page) = page_rx.recv().await else {
                    tracing::warn!("Result channel closed before the batch completed");
                    break;
                };

                let admitted = scheduler.complete(&mut batch, &page);
                match &page.error {
                    Some(e) => tracing::debug!("Visited {} with error: {}", page.url, e),
                    None => tracing::debug!(
                        "Visited {} ({} links, {} new)",
                        page.url,
                        page.link_count(),
                        admitted
                    ),
                }
                emitter.emit(EventKind::PageVisited(page)).await;
            }

            let appended = scheduler.finish_batch(batch);
            tracing::debug!("Appended {} URLs to the frontier", appended);
        }

        scheduler.visited_count()
    }
}

/// Fetches one URL on its own task and sends the result back
///
/// A panicking fetch still reports, as a failed page, so the batch can drain.
fn dispatch<E, F>(fetcher: Arc<PageFetcher<E, F>>, url: Url, results: mpsc::Sender<PageResult>)
where
    E: LinkExtractor + 'static,
    F: UrlFilter + 'static,
{
    tokio::spawn(async move {
        let task_url = url.clone();
        let page = match tokio::spawn(async move { fetcher.fetch(task_url).await }).await {
            Ok(page) => page,
            Err(e) => {
                let error = SpiderError::Task {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                PageResult::failure(url, error)
            }
        };

        if results.send(page).await.is_err() {
            tracing::warn!("Dropped a page result, the coordinator is gone");
        }
    });
}

/// Sends events tagged with the crawl's domain
///
/// A receiver that has gone away is reported once; the crawl carries on regardless.
struct Emitter<'a> {
    events: &'a mpsc::Sender<CrawlEvent>,
    id: String,
    closed: bool,
}

impl<'a> Emitter<'a> {
    fn new(events: &'a mpsc::Sender<CrawlEvent>, id: String) -> Self {
        Self {
            events,
            id,
            closed: false,
        }
    }

    async fn emit(&mut self, kind: EventKind) {
        if self.closed {
            return;
        }
        let event = CrawlEvent::new(self.id.clone(), kind);
        if self.events.send(event).await.is_err() {
            tracing::warn!("Event receiver dropped, further events for {} are discarded", self.id);
            self.closed = true;
        }
    }
}
