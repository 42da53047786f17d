//! Error types for the crawler module

use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status on the static path
    #[error("HTTP status {0}")]
    Status(u16),

    /// Browser render fallback error
    #[error("Render error: {0}")]
    Render(String),

    /// Render fallback exceeded its bounded wait
    #[error("Render timed out after {0:?}")]
    RenderTimeout(std::time::Duration),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Entry URL is malformed or not http(s)
    #[error("Invalid entry URL: {0}")]
    InvalidEntryUrl(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
