//! Output module for consuming crawl events
//!
//! This module handles:
//! - Rendering events as text lines
//! - Recording crawl statistics from the event stream

mod render;
pub mod stats;

pub use render::render_event;
pub use stats::{print_statistics, CrawlStatistics};
