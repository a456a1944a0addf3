//! URL handling module for Spider-Crawl
//!
//! This module resolves raw hyperlinks against the page they were found on, strips the
//! parts of a URL that do not identify a page, and decides which links stay inside the
//! crawled domain.

mod domain;
mod normalize;

pub use domain::{extract_host, SameDomainFilter, UrlFilter};
pub use normalize::{canonical_key, parse_seed, resolve_link, strip_volatile};
