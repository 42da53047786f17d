//! Breadth-first crawl traversal
//!
//! Drives the depth-bounded crawl over an explicit frontier queue and a
//! visited set. Processing all nodes at depth `d` before depth `d + 1`
//! guarantees the shallowest pages survive any later depth or token budget
//! truncation, and keeps termination auditable: every URL enters the frontier
//! at most once, so the loop ends when the frontier drains.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::crawler::error::CrawlError;
use crate::crawler::extract::extract;
use crate::crawler::fetch::{Fetcher, Render};
use crate::crawler::scope::ScopeFilter;
use crate::crawler::{CrawlTarget, CrawlerConfig, PageRecord};

/// Outcome of a completed crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Ordered corpus of extracted pages (discovery order)
    pub pages: Vec<PageRecord>,

    /// URLs fetched (successfully or with a terminal failure)
    pub visited: usize,

    /// Frontier entries rejected and zero-content pages dropped
    pub skipped: usize,

    /// URLs for which both fetch paths failed
    pub failed: usize,
}

/// Depth-bounded website crawler
pub struct Crawler<R> {
    fetcher: Fetcher<R>,
    scope: ScopeFilter,
    config: CrawlerConfig,
}

impl<R: Render> Crawler<R> {
    /// Create a crawler for the given entry URL.
    ///
    /// Fails when the entry URL is malformed or not http(s); everything after
    /// this point is a per-page soft failure.
    pub fn new(
        entry_url: &str,
        config: CrawlerConfig,
        renderer: R,
    ) -> Result<Self, CrawlError> {
        let scope = ScopeFilter::new(entry_url, config.strip_query)
            .ok_or_else(|| CrawlError::InvalidEntryUrl(entry_url.to_string()))?;
        let fetcher = Fetcher::new(&config, renderer)?;

        Ok(Self {
            fetcher,
            scope,
            config,
        })
    }

    /// Crawl from the entry URL up to the configured depth.
    ///
    /// Per-page fetch and extraction failures are logged and skipped; the
    /// returned report always covers whatever could be processed.
    pub async fn crawl(&self) -> CrawlReport {
        let entry = self.scope.entry_url().to_string();
        info!(
            "Starting crawl for {} with max depth {}",
            entry, self.config.max_depth
        );

        let mut frontier: VecDeque<CrawlTarget> = VecDeque::new();
        // Everything ever enqueued; guarantees no URL is queued twice, which
        // also pins each URL to its shallowest discovery depth.
        let mut seen: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();

        frontier.push_back(CrawlTarget {
            url: entry.clone(),
            depth: 0,
        });
        seen.insert(entry);

        let mut pages = Vec::new();
        let mut skipped = 0usize;
        let mut failed = 0usize;

        while let Some(target) = frontier.pop_front() {
            if target.depth > self.config.max_depth || visited.contains(&target.url) {
                debug!("Skipping {} at depth {}", target.url, target.depth);
                skipped += 1;
                continue;
            }
            if visited.len() >= self.config.max_pages as usize {
                info!("Page limit {} reached, stopping crawl", self.config.max_pages);
                break;
            }

            if !visited.is_empty() {
                tokio::time::sleep(self.config.rate_limit()).await;
            }
            visited.insert(target.url.clone());
            info!("Crawling {} at depth {}", target.url, target.depth);

            let fetched = match self.fetcher.fetch(&target.url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", target.url, e);
                    failed += 1;
                    continue;
                }
            };

            let page = extract(
                &fetched.html,
                &target.url,
                target.depth,
                fetched.used_fallback,
                &self.scope,
                &self.config,
            );

            if target.depth < self.config.max_depth {
                for link in &page.links {
                    if seen.insert(link.clone()) {
                        frontier.push_back(CrawlTarget {
                            url: link.clone(),
                            depth: target.depth + 1,
                        });
                    }
                }
            }

            if page.text.is_empty() {
                debug!("Dropping zero-content page {}", page.url);
                skipped += 1;
            } else {
                pages.push(page);
            }
        }

        let report = CrawlReport {
            visited: visited.len(),
            skipped,
            failed,
            pages,
        };
        info!(
            "Crawl finished: {} pages, {} visited, {} skipped, {} failed",
            report.pages.len(),
            report.visited,
            report.skipped,
            report.failed
        );
        report
    }
}
