//! Headless-Chrome render backend for the fetch fallback
//!
//! Drives chromiumoxide: launch a headless browser, open the page, wait for
//! navigation to settle, and read back the rendered HTML. The browser is
//! launched lazily on the first fallback so crawls of fully static sites
//! never pay the startup cost.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::crawler::error::CrawlError;
use crate::crawler::fetch::Render;

/// Renders pages through a lazily launched headless Chrome instance
pub struct ChromeRenderer {
    browser: OnceCell<Browser>,
    handler_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ChromeRenderer {
    /// Create a renderer; no browser process is started yet
    pub fn new() -> Self {
        Self {
            browser: OnceCell::new(),
            handler_task: std::sync::Mutex::new(None),
        }
    }

    async fn browser(&self) -> Result<&Browser, CrawlError> {
        self.browser
            .get_or_try_init(|| async {
                info!("Launching headless browser for render fallback");
                let config = BrowserConfig::builder()
                    .no_sandbox()
                    .build()
                    .map_err(CrawlError::Render)?;

                let (browser, mut handler) = Browser::launch(config)
                    .await
                    .map_err(|e| CrawlError::Render(e.to_string()))?;

                // The handler stream must be pumped for the CDP connection to
                // make progress; it ends when the browser is dropped.
                let task = tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if let Err(e) = event {
                            debug!("Browser handler event error: {}", e);
                        }
                    }
                });
                if let Ok(mut guard) = self.handler_task.lock() {
                    *guard = Some(task);
                }

                Ok(browser)
            })
            .await
    }
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for ChromeRenderer {
    async fn render(&self, url: &str, wait: Duration) -> Result<String, CrawlError> {
        let browser = self.browser().await?;

        let rendered = tokio::time::timeout(wait, async {
            let page = browser
                .new_page(url)
                .await
                .map_err(|e| CrawlError::Render(e.to_string()))?;

            page.wait_for_navigation()
                .await
                .map_err(|e| CrawlError::Render(e.to_string()))?;

            let html = page
                .content()
                .await
                .map_err(|e| CrawlError::Render(e.to_string()))?;

            if let Err(e) = page.close().await {
                warn!("Failed to close rendered page for {}: {}", url, e);
            }

            Ok::<_, CrawlError>(html)
        })
        .await
        .map_err(|_| CrawlError::RenderTimeout(wait))??;

        Ok(rendered)
    }
}
