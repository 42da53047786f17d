//! Page fetching: fast static path with a browser-render fallback
//!
//! The fetcher first tries a plain HTTP GET with a bounded timeout. Any
//! non-2xx status, timeout, or connection error is a soft failure that routes
//! the URL through a JavaScript-capable renderer instead. Only when both
//! paths are exhausted does the fetch fail, and the caller treats that as a
//! per-page soft failure rather than a run abort.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tracing::{debug, warn};

use crate::crawler::CrawlerConfig;
use crate::crawler::error::CrawlError;

/// Raw HTML for a URL, with a flag telling which path produced it
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw HTML of the page
    pub html: String,

    /// True when the browser-render fallback was used
    pub used_fallback: bool,
}

/// A JavaScript-capable rendering backend.
///
/// The production implementation drives a headless Chrome instance; tests
/// inject a deterministic fake.
pub trait Render {
    /// Render the page at `url`, waiting at most `wait` for the DOM to settle,
    /// and return the rendered HTML.
    fn render(
        &self,
        url: &str,
        wait: Duration,
    ) -> impl Future<Output = Result<String, CrawlError>> + Send;
}

/// Retrieves raw HTML for a URL, static path first, renderer second
#[derive(Debug)]
pub struct Fetcher<R> {
    http: ReqwestClient,
    renderer: R,
    fetch_timeout: Duration,
    render_timeout: Duration,
}

impl<R: Render> Fetcher<R> {
    /// Create a fetcher from the crawler configuration and a renderer
    pub fn new(config: &CrawlerConfig, renderer: R) -> Result<Self, CrawlError> {
        let http = ReqwestClient::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CrawlError::Http)?;

        Ok(Self {
            http,
            renderer,
            fetch_timeout: config.fetch_timeout,
            render_timeout: config.render_timeout,
        })
    }

    /// Fetch the raw HTML for a URL.
    ///
    /// Falls back to the renderer when the static path fails for any reason.
    /// An error here means both paths were exhausted.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        match self.fetch_static(url).await {
            Ok(html) => Ok(FetchedPage {
                html,
                used_fallback: false,
            }),
            Err(e) => {
                warn!("Static fetch failed for {}: {}, trying render fallback", url, e);
                let html = self.renderer.render(url, self.render_timeout).await?;
                debug!("Render fallback succeeded for {}", url);
                Ok(FetchedPage {
                    html,
                    used_fallback: true,
                })
            }
        }
    }

    async fn fetch_static(&self, url: &str) -> Result<String, CrawlError> {
        debug!("GET {} (timeout {:?})", url, self.fetch_timeout);
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
