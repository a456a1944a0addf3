use super::normalize::resolve_link;
use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from a URL
///
/// The `url` crate already lowercases domain hosts while parsing, so hosts compare
/// case-insensitively. Ports are not part of the host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use spider_crawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.com:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Decides which discovered links the crawler follows
///
/// Implementations get the crawl root, the page the link was found on and the raw
/// attribute value. Any `Err` means the link is dropped.
pub trait UrlFilter: Send + Sync {
    fn filter_map(&self, root: &Url, parent: &Url, raw: &str) -> UrlResult<Url>;
}

/// Keeps links whose host is exactly the root's host
///
/// Subdomains count as different domains.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameDomainFilter;

impl UrlFilter for SameDomainFilter {
    fn filter_map(&self, root: &Url, parent: &Url, raw: &str) -> UrlResult<Url> {
        let url = resolve_link(root, parent, raw)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let expected = extract_host(root).ok_or(UrlError::MissingHost)?;
        let found = extract_host(&url).ok_or(UrlError::MissingHost)?;
        if found != expected {
            return Err(UrlError::ForeignHost { expected, found });
        }

        Ok(url)
    }
}
