//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and check the event stream of
//! full crawls end-to-end.

use spider_crawl::config::CrawlConfig;
use spider_crawl::crawler::{PageResult, Spider};
use spider_crawl::events::{CrawlEvent, EventKind};
use spider_crawl::SpiderError;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(concurrency: usize) -> CrawlConfig {
    CrawlConfig {
        concurrency,
        timeout_secs: 1,
        user_agent: "TestBot/1.0".to_string(),
        event_buffer: 4,
    }
}

/// Runs a crawl to completion while draining its events
async fn run_crawl(seed: &str, concurrency: usize) -> (usize, Vec<CrawlEvent>) {
    let (tx, mut rx) = mpsc::channel(4);
    let spider = Spider::new(test_config(concurrency), tx);
    let seed = seed.to_string();
    let handle = tokio::spawn(async move { spider.crawl(&seed).await });

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let visited = handle
        .await
        .expect("crawl task panicked")
        .expect("crawl failed");
    (visited, events)
}

/// Mounts an HTML page linking to `hrefs`, expected to be fetched exactly once
async fn mount_page(server: &MockServer, page: &str, hrefs: &[&str]) {
    let body = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect::<Vec<_>>()
        .join("\n");

    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", body))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Visited pages keyed by URL path
fn visited_pages(events: &[CrawlEvent]) -> HashMap<String, &PageResult> {
    let mut pages = HashMap::new();
    for event in events {
        if let EventKind::PageVisited(page) = event.kind() {
            let previous = pages.insert(page.url.path().to_string(), page);
            assert!(previous.is_none(), "{} visited twice", page.url);
        }
    }
    pages
}

/// Checks the overall event sequence of a crawl that started
fn assert_well_formed(events: &[CrawlEvent], visited: usize, domain: &str) {
    assert!(matches!(events[0].kind(), EventKind::CrawlStarted));
    match events.last().map(CrawlEvent::kind) {
        Some(EventKind::CrawlEnded { visited_count }) => assert_eq!(*visited_count, visited),
        other => panic!("last event should be CrawlEnded, got {:?}", other),
    }
    assert_eq!(events.len(), visited + 2);
    assert!(events.iter().all(|e| e.id() == domain));
    assert!(events.windows(2).all(|w| w[0].when() <= w[1].when()));
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", &["/page1", &format!("{}/page2", base_url)]).await;
    mount_page(&server, "/page1", &["/"]).await;
    mount_page(&server, "/page2", &["/page1"]).await;

    let (visited, events) = run_crawl(&format!("{}/", base_url), 8).await;

    assert_eq!(visited, 3);
    assert_well_formed(&events, 3, "127.0.0.1");

    let pages = visited_pages(&events);
    assert!(pages.values().all(|p| p.is_success()));
    let root_links = pages["/"].links.as_ref().unwrap();
    assert!(root_links.contains_key(&format!("{}/page1", base_url)));
    assert!(root_links.contains_key(&format!("{}/page2", base_url)));
}

#[tokio::test]
async fn test_same_target_via_two_hrefs_visited_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        &["/about", &format!("{}/about", base_url), "/about/", "/about?x=1#team"],
    )
    .await;
    mount_page(&server, "/about", &[]).await;

    let (visited, events) = run_crawl(&base_url, 64).await;

    assert_eq!(visited, 2);
    let pages = visited_pages(&events);
    assert_eq!(pages["/"].link_count(), 1);
    assert!(pages.contains_key("/about"));
}

#[tokio::test]
async fn test_seed_with_fragment_visited_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", &[base_url.as_str(), "/?tab=home"]).await;

    let (visited, events) = run_crawl(&format!("{}/#top", base_url), 4).await;

    assert_eq!(visited, 1);
    assert_well_formed(&events, 1, "127.0.0.1");
    let pages = visited_pages(&events);
    assert_eq!(pages["/"].url.fragment(), None);
}

#[tokio::test]
async fn test_foreign_links_discarded() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &[
            "https://other.com/x",
            "//cdn.other.com/lib.js",
            "mailto:team@example.com",
            "/local",
        ],
    )
    .await;
    mount_page(&server, "/local", &[]).await;

    let (visited, events) = run_crawl(&format!("{}/", server.uri()), 4).await;

    assert_eq!(visited, 2);
    let pages = visited_pages(&events);
    let links = pages["/"].links.as_ref().unwrap();
    assert_eq!(links.len(), 1);
    assert!(links.keys().all(|k| !k.contains("other.com")));
}

#[tokio::test]
async fn test_invalid_seed_single_event() {
    let (visited, events) = run_crawl("not a url", 4).await;

    assert_eq!(visited, 0);
    assert_eq!(events.len(), 1);
    match events[0].kind() {
        EventKind::InvalidArgument { raw_url, error } => {
            assert_eq!(raw_url, "not a url");
            assert!(error.starts_with("the given URL 'not a url' is not valid"));
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[tokio::test]
async fn test_seed_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (visited, events) = run_crawl(&format!("{}/", server.uri()), 4).await;

    assert_eq!(visited, 1);
    assert_well_formed(&events, 1, "127.0.0.1");

    let pages = visited_pages(&events);
    let page = pages["/"];
    assert!(page.links.is_none());
    match &page.error {
        Some(SpiderError::Status { status_code, .. }) => assert_eq!(*status_code, 404),
        other => panic!("expected a status error, got {:?}", other),
    }
    assert!(page.error.as_ref().unwrap().to_string().contains("404"));
}

#[tokio::test]
async fn test_invalid_escape_dropped_without_page_error() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["%", "/ok%2", "/fine"]).await;
    mount_page(&server, "/fine", &[]).await;

    let (visited, events) = run_crawl(&server.uri(), 4).await;

    assert_eq!(visited, 2);
    let pages = visited_pages(&events);
    assert!(pages["/"].is_success());
    assert_eq!(pages["/"].link_count(), 1);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/broken", "/missing", "/next"]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/next", &["/last"]).await;
    mount_page(&server, "/last", &[]).await;

    let (visited, events) = run_crawl(&server.uri(), 2).await;

    assert_eq!(visited, 5);
    let pages = visited_pages(&events);
    assert!(!pages["/broken"].is_success());
    assert!(!pages["/missing"].is_success());
    assert!(pages["/last"].is_success());
}

#[tokio::test]
async fn test_cycle_terminates() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/a"]).await;
    mount_page(&server, "/a", &["/b", "/"]).await;
    mount_page(&server, "/b", &["/", "/a", "/b"]).await;

    let (visited, events) = run_crawl(&server.uri(), 64).await;

    assert_eq!(visited, 3);
    assert_well_formed(&events, 3, "127.0.0.1");
}

#[tokio::test]
async fn test_siblings_discovering_same_link() {
    let server = MockServer::start().await;

    // /a and /b are fetched in the same batch, link to each other and to /c
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &["/b", "/c"]).await;
    mount_page(&server, "/b", &["/a", "/c"]).await;
    mount_page(&server, "/c", &["/"]).await;

    let (visited, events) = run_crawl(&server.uri(), 64).await;

    assert_eq!(visited, 4);
    assert_eq!(visited_pages(&events).len(), 4);
}

#[tokio::test]
async fn test_concurrency_one_visits_everything() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/a", "/b", "/c"]).await;
    mount_page(&server, "/a", &["/b", "/d"]).await;
    mount_page(&server, "/b", &["/c", "/d"]).await;
    mount_page(&server, "/c", &[]).await;
    mount_page(&server, "/d", &["/a"]).await;

    let (visited, events) = run_crawl(&server.uri(), 1).await;

    assert_eq!(visited, 5);
    assert_well_formed(&events, 5, "127.0.0.1");
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/slow"]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let (visited, events) = run_crawl(&server.uri(), 4).await;

    assert_eq!(visited, 2);
    let pages = visited_pages(&events);
    assert!(matches!(
        pages["/slow"].error,
        Some(SpiderError::Http { .. })
    ));
}
