//! URL normalization and crawl-scope filtering
//!
//! A discovered URL is eligible for crawling only when it shares the entry
//! URL's scheme, host, and path prefix. Comparison is performed on normalized
//! URLs: fragments are stripped, trailing slashes are removed from the path,
//! and query strings are optionally dropped.

use tracing::debug;
use url::Url;

/// Normalize a URL for comparison and dedup.
///
/// The `url` crate already lowercases the scheme and host during parsing.
/// On top of that, the fragment is stripped, the path loses its trailing
/// slash, and the query string is dropped when `strip_query` is set.
///
/// Returns `None` for malformed URLs and non-http(s) schemes.
pub fn normalize_url(raw: &str, strip_query: bool) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);
    if strip_query {
        url.set_query(None);
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    Some(url.to_string())
}

/// Decides whether a discovered URL is eligible for crawling
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    entry: Url,
    base_path: String,
    strip_query: bool,
}

impl ScopeFilter {
    /// Create a scope filter anchored at the entry URL.
    ///
    /// Returns `None` when the entry URL itself is malformed or not http(s).
    pub fn new(entry_url: &str, strip_query: bool) -> Option<Self> {
        let normalized = normalize_url(entry_url, strip_query)?;
        let entry = Url::parse(&normalized).ok()?;
        entry.host_str()?;

        let base_path = entry.path().trim_end_matches('/').to_string();

        Some(Self {
            entry,
            base_path,
            strip_query,
        })
    }

    /// The normalized entry URL the filter is anchored at
    pub fn entry_url(&self) -> &str {
        self.entry.as_str()
    }

    /// Normalize a candidate URL with this filter's query policy
    pub fn normalize(&self, raw: &str) -> Option<String> {
        normalize_url(raw, self.strip_query)
    }

    /// Check whether a candidate URL falls inside the crawl scope.
    ///
    /// True iff the normalized candidate shares the entry URL's scheme, host,
    /// and port, and its path equals the entry path or extends it by at least
    /// one segment. Malformed URLs are logged and rejected, never fatal.
    pub fn is_in_scope(&self, candidate: &str) -> bool {
        let Some(normalized) = self.normalize(candidate) else {
            debug!("Skipping malformed URL: {}", candidate);
            return false;
        };
        // Normalization already succeeded once, so this parse cannot fail.
        let Ok(url) = Url::parse(&normalized) else {
            return false;
        };

        if url.scheme() != self.entry.scheme()
            || url.host_str() != self.entry.host_str()
            || url.port_or_known_default() != self.entry.port_or_known_default()
        {
            debug!("URL {} is outside host {:?}", candidate, self.entry.host_str());
            return false;
        }

        let path = url.path().trim_end_matches('/');
        if path != self.base_path && !path.starts_with(&format!("{}/", self.base_path)) {
            debug!("URL {} is outside base path {}", candidate, self.base_path);
            return false;
        }

        true
    }
}
