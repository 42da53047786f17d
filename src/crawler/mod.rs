//! Website crawler module
//!
//! This module provides functionality for crawling a documentation website
//! starting from a single entry URL: scope filtering, static fetching with a
//! browser-render fallback, content extraction, and the breadth-first
//! traversal that ties them together.

mod browser;
mod config;
mod error;
mod extract;
mod fetch;
mod orchestrator;
mod scope;

pub use browser::ChromeRenderer;
pub use config::CrawlerConfig;
pub use error::CrawlError;
pub use extract::extract;
pub use fetch::{FetchedPage, Fetcher, Render};
pub use orchestrator::{CrawlReport, Crawler};
pub use scope::{ScopeFilter, normalize_url};

use serde::{Deserialize, Serialize};

/// A URL queued for crawling, with the depth at which it was discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Normalized URL
    pub url: String,

    /// Link-hops from the entry URL
    pub depth: u32,
}

/// Result of successfully processing one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL of the page (normalized)
    pub url: String,

    /// Title of the page
    pub title: String,

    /// Cleaned page text, reading order preserved
    pub text: String,

    /// In-scope outbound links, in discovery order
    pub links: Vec<String>,

    /// Depth at which the page was reached
    pub depth: u32,

    /// Whether the browser-render fallback produced the HTML
    pub used_fallback: bool,

    /// Whether the text was cut down to fit the token budget
    #[serde(default)]
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_record_roundtrip() {
        let record = PageRecord {
            url: "https://docs.example.com/guide".to_string(),
            title: "Guide".to_string(),
            text: "Some content".to_string(),
            links: vec!["https://docs.example.com/guide/install".to_string()],
            depth: 1,
            used_fallback: false,
            truncated: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: PageRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.url, record.url);
        assert_eq!(parsed.title, "Guide");
        assert_eq!(parsed.links.len(), 1);
        assert!(!parsed.used_fallback);
    }
}
