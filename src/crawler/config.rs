//! # Crawler Configuration Module
//!
//! Configuration options for the web crawler: crawl depth, page limits, rate
//! limiting, fetch/render timeouts, and content selection. Uses a builder
//! pattern for flexible configuration.

use std::time::Duration;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl
    pub max_depth: u32,

    /// Maximum number of pages to fetch
    pub max_pages: u32,

    /// Rate limit in milliseconds between requests
    pub rate_limit_ms: u64,

    /// Timeout for the static HTTP fetch path
    pub fetch_timeout: Duration,

    /// Bounded wait for the browser-render fallback
    pub render_timeout: Duration,

    /// Whether to strip query strings during URL normalization
    pub strip_query: bool,

    /// User agent to use for requests
    pub user_agent: String,

    /// CSS selectors for content to include
    pub content_selectors: Vec<String>,

    /// CSS selectors for elements to exclude
    pub exclude_selectors: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 100,
            rate_limit_ms: 500,
            fetch_timeout: Duration::from_secs(10),
            render_timeout: Duration::from_secs(15),
            strip_query: false,
            user_agent: format!("docweave/{}", env!("CARGO_PKG_VERSION")),
            content_selectors: Vec::new(),
            exclude_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                ".navigation".to_string(),
                ".menu".to_string(),
                ".sidebar".to_string(),
                ".ads".to_string(),
                ".comments".to_string(),
                "#nav".to_string(),
                "#header".to_string(),
                "#footer".to_string(),
                "#sidebar".to_string(),
                "#comments".to_string(),
            ],
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum depth to crawl
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the maximum number of pages to fetch
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the rate limit in milliseconds between requests
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the timeout for the static fetch path
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Set the bounded wait for the render fallback
    pub fn render_timeout(mut self, timeout: Duration) -> Self {
        self.config.render_timeout = timeout;
        self
    }

    /// Set whether query strings are stripped during normalization
    pub fn strip_query(mut self, strip_query: bool) -> Self {
        self.config.strip_query = strip_query;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the CSS selectors for content to include
    pub fn content_selectors(mut self, content_selectors: Vec<String>) -> Self {
        self.config.content_selectors = content_selectors;
        self
    }

    /// Set the CSS selectors for elements to exclude
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the rate limit as a Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}
