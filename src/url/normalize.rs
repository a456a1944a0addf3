use crate::{UrlError, UrlResult};
use percent_encoding::percent_decode_str;
use url::Url;

/// Resolves a raw hyperlink into an absolute URL without query or fragment
///
/// # Resolution Steps
///
/// 1. Trim surrounding whitespace and a single trailing `/`; reject if nothing is left
/// 2. Percent-decode; reject malformed escapes. A decoded literal `%` is escaped again as
///    `%25`, so feeding an accepted URL back in yields the same URL
/// 3. Resolve, trying in order:
///    - `//host/path` inherits the root's scheme
///    - `/path` resolves against the root's origin
///    - anything without `://` resolves against the parent page
///    - everything else is parsed as an absolute URL
/// 4. Strip the query string and the fragment
///
/// Host filtering is not done here, see [`SameDomainFilter`](super::SameDomainFilter).
///
/// # Examples
///
/// ```
/// use spider_crawl::url::resolve_link;
/// use url::Url;
///
/// let root = Url::parse("https://example.com").unwrap();
/// let parent = Url::parse("https://example.com/docs/").unwrap();
///
/// let url = resolve_link(&root, &parent, "intro?page=2#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro");
/// ```
pub fn resolve_link(root: &Url, parent: &Url, raw: &str) -> UrlResult<Url> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let decoded = percent_decode_strict(trimmed)?.replace('%', "%25");

    let parsed = if decoded.starts_with("//") {
        Url::parse(&format!("{}:{}", root.scheme(), decoded))
    } else if decoded.starts_with('/') {
        root.join(&decoded)
    } else if !decoded.contains("://") {
        parent.join(&decoded)
    } else {
        Url::parse(&decoded)
    };

    let mut url = parsed.map_err(|e| UrlError::Parse(format!("{}: {}", decoded, e)))?;
    strip_volatile(&mut url);

    Ok(url)
}

/// Parses the seed URL of a crawl
///
/// The seed must be absolute, use `http` or `https` and carry a host. Its query and
/// fragment are stripped like those of every discovered link.
pub fn parse_seed(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    strip_volatile(&mut url);
    Ok(url)
}

/// Returns the dedup key of a URL: its percent-decoded string form
///
/// Two URLs with the same key are the same page as far as the crawler is concerned.
pub fn canonical_key(url: &Url) -> String {
    percent_decode_str(url.as_str())
        .decode_utf8_lossy()
        .into_owned()
}

/// Removes the query string and fragment
pub fn strip_volatile(url: &mut Url) {
    url.set_fragment(None);
    url.set_query(None);
}

/// Percent-decodes a string, rejecting `%` not followed by two hex digits
fn percent_decode_strict(raw: &str) -> UrlResult<String> {
    let bytes = raw.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }
        let escape = bytes.get(i + 1..i + 3);
        if !escape.map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(UrlError::Decode(format!("invalid escape at byte {} in {}", i, raw)));
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| UrlError::Decode(e.to_string()))
}
