//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the lifecycle of one crawl (not started, running, ended)

mod crawl_state;

pub use crawl_state::CrawlState;
