//! Error types for the docweave crate

use thiserror::Error;

/// Result type for docweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docweave operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration detected before any crawling began
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(#[from] crate::crawler::CrawlError),

    /// Consolidation error
    #[error("Consolidation error: {0}")]
    Consolidate(#[from] crate::consolidator::ConsolidateError),

    /// Output file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
