//! End-to-end pipeline: crawl, partition, consolidate, write
//!
//! Wires the crawler and consolidator together for one run and performs the
//! single output write. Configuration errors surface before any crawling
//! begins; everything later is recovered per page or per partition.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::consolidator::{CharEstimator, Consolidator, RunStatus, TokenEstimator};
use crate::crawler::{ChromeRenderer, Crawler, CrawlerConfig, Render};
use crate::error::{Error, Result};
use crate::llm::LlmClient;

/// Default OpenAI-compatible API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model for consolidation
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default token budget per LLM call
pub const DEFAULT_TOKEN_LIMIT: usize = 8000;

/// Everything one pipeline run needs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Entry URL defining the crawl scope
    pub entry_url: String,

    /// Crawler settings (depth, limits, selectors, timeouts)
    pub crawler: CrawlerConfig,

    /// Output markdown path, overwritten if it exists
    pub output: PathBuf,

    /// LLM model identifier
    pub model: String,

    /// Token budget per LLM call
    pub token_limit: usize,

    /// LLM API credential
    pub api_key: String,

    /// OpenAI-compatible API base URL
    pub api_base_url: String,
}

impl PipelineConfig {
    /// Start building a config for the given entry URL
    pub fn builder(entry_url: impl Into<String>) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            entry_url: entry_url.into(),
            crawler: CrawlerConfig::default(),
            output: PathBuf::from("output.md"),
            model: DEFAULT_MODEL.to_string(),
            token_limit: DEFAULT_TOKEN_LIMIT,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    entry_url: String,
    crawler: CrawlerConfig,
    output: PathBuf,
    model: String,
    token_limit: usize,
    api_key: Option<String>,
    api_base_url: String,
}

impl PipelineConfigBuilder {
    /// Set the maximum crawl depth
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.crawler.max_depth = max_depth;
        self
    }

    /// Replace the whole crawler configuration
    pub fn crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }

    /// Set the output path
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the LLM model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the token budget per LLM call
    pub fn token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    /// Set the LLM API credential
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the OpenAI-compatible API base URL
    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// All fatal configuration errors are raised here, before any crawling:
    /// a missing API key, an out-of-scope entry URL, or an output path whose
    /// parent directory does not exist.
    pub fn build(self) -> Result<PipelineConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        if crate::crawler::normalize_url(&self.entry_url, false).is_none() {
            return Err(Error::Config(format!(
                "Invalid entry URL: {}",
                self.entry_url
            )));
        }

        validate_output_path(&self.output)?;

        Ok(PipelineConfig {
            entry_url: self.entry_url,
            crawler: self.crawler,
            output: self.output,
            model: self.model,
            token_limit: self.token_limit,
            api_key,
            api_base_url: self.api_base_url,
        })
    }
}

fn validate_output_path(output: &Path) -> Result<()> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(Error::Config(format!(
            "Output directory does not exist: {}",
            parent.display()
        )));
    }
    Ok(())
}

/// Counters and status for a finished run
#[derive(Debug)]
pub struct PipelineSummary {
    /// URLs fetched
    pub visited: usize,

    /// Frontier entries and zero-content pages skipped
    pub skipped: usize,

    /// URLs that failed both fetch paths
    pub failed: usize,

    /// Pages that made it into the corpus
    pub pages: usize,

    /// Consolidation status
    pub status: RunStatus,
}

/// Run the full pipeline with the default renderer and token estimator
pub async fn run(config: PipelineConfig) -> Result<PipelineSummary> {
    run_with(config, ChromeRenderer::new(), CharEstimator).await
}

/// Run the full pipeline with explicit renderer and estimator.
///
/// Split out from [`run`] so tests can supply deterministic collaborators.
pub async fn run_with<R, E>(config: PipelineConfig, renderer: R, estimator: E) -> Result<PipelineSummary>
where
    R: Render,
    E: TokenEstimator,
{
    let crawler = Crawler::new(&config.entry_url, config.crawler.clone(), renderer)?;
    let report = crawler.crawl().await;

    if report.pages.is_empty() {
        error!("No pages were successfully crawled");
        return Err(Error::Crawl(crate::crawler::CrawlError::Other(
            "no pages were successfully crawled".to_string(),
        )));
    }
    info!("Successfully crawled {} pages", report.pages.len());

    let client = LlmClient::new(config.api_key.clone(), config.api_base_url.clone());
    let consolidator = Consolidator::new(client, config.model.clone(), config.token_limit, estimator);

    info!("Starting content consolidation");
    let page_count = report.pages.len();
    let result = consolidator.consolidate(report.pages).await?;

    tokio::fs::write(&config.output, &result.markdown).await?;
    info!(
        "Wrote consolidated content to {} (status {:?})",
        config.output.display(),
        result.status
    );

    Ok(PipelineSummary {
        visited: report.visited,
        skipped: report.skipped,
        failed: report.failed,
        pages: page_count,
        status: result.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlError;
    use std::time::Duration;

    struct NoRender;

    impl Render for NoRender {
        async fn render(&self, _url: &str, _wait: Duration) -> std::result::Result<String, CrawlError> {
            Err(CrawlError::Render("unavailable".to_string()))
        }
    }

    struct WordEstimator;

    impl TokenEstimator for WordEstimator {
        fn estimate(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = PipelineConfig::builder("https://x.test/docs/").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_entry_url_is_fatal() {
        let result = PipelineConfig::builder("not a url").api_key("key").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_output_directory_is_fatal() {
        let result = PipelineConfig::builder("https://x.test/docs/")
            .api_key("key")
            .output("/definitely/not/a/dir/out.md")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_end_to_end_writes_output() {
        let mut site = mockito::Server::new_async().await;
        site.mock("GET", "/docs")
            .with_body(
                "<html><head><title>Docs</title></head>\
                 <body><p>Alpha beta gamma.</p><a href=\"/docs/a\">a</a></body></html>",
            )
            .create_async()
            .await;
        site.mock("GET", "/docs/a")
            .with_body("<html><head><title>A</title></head><body><p>Delta epsilon.</p></body></html>")
            .create_async()
            .await;

        let mut llm = mockito::Server::new_async().await;
        llm.mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "# Docs\n\nMerged."}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.md");

        let config = PipelineConfig::builder(format!("{}/docs/", site.url()))
            .api_key("test-key")
            .api_base_url(llm.url())
            .output(&output)
            .crawler(
                CrawlerConfig::builder()
                    .max_depth(1)
                    .rate_limit_ms(0)
                    .build(),
            )
            .build()
            .unwrap();

        let summary = run_with(config, NoRender, WordEstimator).await.unwrap();

        assert_eq!(summary.status, RunStatus::Success);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.visited, 2);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "# Docs\n\nMerged.");
    }

    #[tokio::test]
    async fn test_partial_run_still_writes_output() {
        let mut site = mockito::Server::new_async().await;
        site.mock("GET", "/docs")
            .with_body(
                "<html><head><title>Docs</title></head>\
                 <body><p>word word word word word word word word word word \
                 word word word word word word word word word word</p>\
                 <a href=\"/docs/a\">a</a></body></html>",
            )
            .create_async()
            .await;
        site.mock("GET", "/docs/a")
            .with_body(
                "<html><head><title>A</title></head>\
                 <body><p>word word word word word word word word word word \
                 word word word word word word word word word word</p></body></html>",
            )
            .create_async()
            .await;

        let mut llm = mockito::Server::new_async().await;
        // First partition fails twice (call + retry), the rest succeed.
        llm.mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .expect(2)
            .create_async()
            .await;
        llm.mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "partial doc"}}]
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.md");

        let config = PipelineConfig::builder(format!("{}/docs/", site.url()))
            .api_key("test-key")
            .api_base_url(llm.url())
            .output(&output)
            .token_limit(25)
            .crawler(
                CrawlerConfig::builder()
                    .max_depth(1)
                    .rate_limit_ms(0)
                    .build(),
            )
            .build()
            .unwrap();

        let summary = run_with(config, NoRender, WordEstimator).await.unwrap();

        assert_eq!(summary.status, RunStatus::Partial);
        assert!(output.exists());
    }
}
