//! Scheduler for managing the crawl frontier and the visited set
//!
//! This module handles:
//! - The frontier queue of URLs waiting to be fetched
//! - Cutting bounded batches off the head of the frontier
//! - Tracking URLs in flight for the current batch
//! - Merging discovered links into the next batch without duplicates
//!
//! All of this state is owned by the coordinator. Fetch tasks never touch it, they
//! only send back [`PageResult`]s.

use crate::crawler::fetcher::{LinkMap, PageResult};
use crate::url::canonical_key;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use url::Url;

/// URLs known but not yet fetched, in discovery order
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
}

impl Frontier {
    pub fn new(seed: Url) -> Self {
        Self {
            queue: VecDeque::from([seed]),
        }
    }

    pub fn push(&mut self, url: Url) {
        self.queue.push_back(url);
    }

    /// Removes up to `limit` URLs from the head
    pub fn take(&mut self, limit: usize) -> Vec<Url> {
        let count = limit.min(self.queue.len());
        self.queue.drain(..count).collect()
    }

    /// Canonical keys of every queued URL
    pub fn keys(&self) -> HashSet<String> {
        self.queue.iter().map(canonical_key).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Pages already fetched, keyed by canonical URL string
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashMap<String, Url>,
}

impl VisitedSet {
    /// Returns false if the URL was already visited
    pub fn insert(&mut self, url: Url) -> bool {
        self.urls.insert(canonical_key(&url), url).is_none()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.urls.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

}

/// One group of URLs dispatched together
///
/// The frontier snapshot is taken when the batch is cut, so links discovered by this
/// batch are only checked against what was queued before it.
#[derive(Debug)]
pub struct Batch {
    urls: Vec<Url>,
    frontier_snapshot: HashSet<String>,
    candidates: BTreeMap<String, Url>,
    completed: usize,
}

impl Batch {
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Whether every dispatched URL has reported back
    pub fn is_complete(&self) -> bool {
        self.completed == self.urls.len()
    }
}

/// Owns the frontier, the visited set and the in-flight set of a crawl
///
/// A canonical URL is in at most one of the three at any time.
#[derive(Debug)]
pub struct Scheduler {
    frontier: Frontier,
    visited: VisitedSet,
    in_flight: HashSet<String>,
    concurrency: usize,
}

impl Scheduler {
    /// Creates a scheduler whose frontier holds only the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The first URL to fetch
    /// * `concurrency` - Maximum number of URLs per batch (at least 1)
    pub fn new(seed: Url, concurrency: usize) -> Self {
        Self {
            frontier: Frontier::new(seed),
            visited: VisitedSet::default(),
            in_flight: HashSet::new(),
            concurrency: concurrency.max(1),
        }
    }

    /// Cuts the next batch off the frontier head
    ///
    /// Returns `None` once the frontier is exhausted.
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.frontier.is_empty() {
            return None;
        }

        let urls = self.frontier.take(self.concurrency);
        self.in_flight = urls.iter().map(canonical_key).collect();

        Some(Batch {
            urls,
            frontier_snapshot: self.frontier.keys(),
            candidates: BTreeMap::new(),
            completed: 0,
        })
    }

    /// Records one page of the batch as visited and merges its links
    ///
    /// A link is admitted when it is not visited, not in flight, not in the frontier
    /// snapshot, and not already admitted by a sibling page. Failed pages contribute
    /// no links.
    ///
    /// Returns the number of newly admitted links.
    pub fn complete(&mut self, batch: &mut Batch, page: &PageResult) -> usize {
        let key = canonical_key(&page.url);
        self.in_flight.remove(&key);
        self.visited.insert(page.url.clone());
        batch.completed += 1;

        match &page.links {
            Some(links) if page.error.is_none() => self.admit(batch, links),
            _ => 0,
        }
    }

    fn admit(&self, batch: &mut Batch, links: &LinkMap) -> usize {
        let mut admitted = 0;
        for (key, url) in links {
            if self.visited.contains(key)
                || self.in_flight.contains(key)
                || batch.frontier_snapshot.contains(key)
                || batch.candidates.contains_key(key)
            {
                continue;
            }
            batch.candidates.insert(key.clone(), url.clone());
            admitted += 1;
        }
        admitted
    }

    /// Appends the batch's admitted links to the frontier tail
    ///
    /// Returns the number of URLs appended.
    pub fn finish_batch(&mut self, batch: Batch) -> usize {
        if !batch.is_complete() {
            tracing::warn!(
                "Batch finished with {} of {} pages reported",
                batch.completed,
                batch.urls.len()
            );
        }
        self.in_flight.clear();

        let appended = batch.candidates.len();
        for (_, url) in batch.candidates {
            self.frontier.push(url);
        }
        appended
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of distinct URLs visited
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
