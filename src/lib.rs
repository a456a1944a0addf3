//! Spider-Crawl: a single-domain web crawler
//!
//! This crate crawls every page reachable from a seed URL without leaving the seed's
//! host, visiting each page exactly once, and reports its progress as a stream of
//! events on a channel.

pub mod config;
pub mod crawler;
pub mod events;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Spider-Crawl operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("status code: {status_code}")]
    Status { url: String, status_code: u16 },

    #[error("Fetch task for {url} did not complete: {message}")]
    Task { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty link")]
    Empty,

    #[error("Failed to decode URL: {0}")]
    Decode(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Host {found} does not match {expected}")]
    ForeignHost { expected: String, found: String },
}

/// Result type alias for Spider-Crawl operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{crawl, PageResult, Spider};
pub use events::{CrawlEvent, EventKind};
pub use state::CrawlState;
pub use url::{canonical_key, SameDomainFilter, UrlFilter};
