//! Content consolidation module
//!
//! Takes the crawled corpus, partitions it under the model's token budget,
//! and drives the LLM calls that turn the partitions into one markdown
//! document. Per-partition failures degrade the run to a partial result
//! instead of aborting it.

mod budget;
mod error;
mod prompt;

pub use budget::{CharEstimator, Partition, TokenEstimator, partition};
pub use error::ConsolidateError;

use std::time::Duration;

use tracing::{info, warn};

use crate::crawler::PageRecord;
use crate::llm::LlmClient;

/// Overall outcome of a consolidation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every partition consolidated
    Success,
    /// Some partitions were replaced with placeholders
    Partial,
    /// No partition could be consolidated
    Failed,
}

/// Final markdown plus the status of the run that produced it
#[derive(Debug)]
pub struct ConsolidationResult {
    /// The consolidated markdown document
    pub markdown: String,

    /// Success, partial, or failed
    pub status: RunStatus,
}

/// Builds prompts from the partitioned corpus and invokes the LLM
pub struct Consolidator<E> {
    client: LlmClient,
    model: String,
    token_limit: usize,
    estimator: E,
    retry_backoff: Duration,
    max_output_tokens: Option<u32>,
}

impl<E: TokenEstimator> Consolidator<E> {
    /// Create a consolidator for the given model and token budget
    pub fn new(client: LlmClient, model: impl Into<String>, token_limit: usize, estimator: E) -> Self {
        Self {
            client,
            model: model.into(),
            token_limit,
            estimator,
            retry_backoff: Duration::from_secs(2),
            max_output_tokens: None,
        }
    }

    /// Override the backoff before the single retry of a failed LLM call
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Cap the output tokens requested from the model
    pub fn with_max_output_tokens(mut self, max_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_tokens);
        self
    }

    /// Consolidate the corpus into one markdown document.
    ///
    /// Each partition is summarized by one LLM call (retried once with
    /// backoff); multiple partition outputs are merged by further calls under
    /// the same token budget. Failed partitions are replaced with placeholders
    /// and downgrade the status to [`RunStatus::Partial`].
    pub async fn consolidate(
        &self,
        corpus: Vec<PageRecord>,
    ) -> Result<ConsolidationResult, ConsolidateError> {
        if corpus.is_empty() {
            return Err(ConsolidateError::EmptyCorpus);
        }

        let partitions = partition(corpus, self.token_limit, &self.estimator);
        info!(
            "Consolidating {} partition(s) with model {}",
            partitions.len(),
            self.model
        );

        let mut failures = 0usize;
        let mut fragments = Vec::new();
        for part in &partitions {
            match self.complete_with_retry(&prompt::consolidation_prompt(&part.records)).await {
                Ok(markdown) => fragments.push(markdown),
                Err(e) => {
                    warn!("Consolidation failed for a partition: {}", e);
                    fragments.push(placeholder(&part.records));
                    failures += 1;
                }
            }
        }

        let all_failed = failures == partitions.len();
        let mut partial = failures > 0;

        // Merge rounds: fragments are re-partitioned under the same budget
        // until a single document remains.
        while fragments.len() > 1 {
            let pseudo: Vec<PageRecord> = fragments.drain(..).map(fragment_record).collect();
            let count_before = pseudo.len();
            let groups = partition(pseudo, self.token_limit, &self.estimator);

            if groups.len() == count_before && !all_failed {
                // No grouping possible within the budget; stitch locally
                // rather than looping forever.
                warn!("Fragments do not fit a merge call; stitching without the LLM");
                fragments = vec![
                    groups
                        .iter()
                        .flat_map(|g| g.records.iter())
                        .map(|r| r.text.clone())
                        .collect::<Vec<_>>()
                        .join("\n\n---\n\n"),
                ];
                break;
            }

            for group in &groups {
                if group.records.len() == 1 {
                    // A lone fragment passes through unchanged
                    fragments.push(group.records[0].text.clone());
                    continue;
                }
                match self.complete_with_retry(&prompt::merge_prompt(&group.records)).await {
                    Ok(markdown) => fragments.push(markdown),
                    Err(e) => {
                        warn!("Merge call failed: {}", e);
                        fragments.push(
                            group
                                .records
                                .iter()
                                .map(|r| r.text.clone())
                                .collect::<Vec<_>>()
                                .join("\n\n---\n\n"),
                        );
                        partial = true;
                    }
                }
            }

            if all_failed {
                // Every partition already failed; no point in merge calls
                fragments = vec![fragments.join("\n\n---\n\n")];
                break;
            }
        }

        let markdown = fragments.pop().unwrap_or_default();
        let status = if all_failed {
            RunStatus::Failed
        } else if partial {
            RunStatus::Partial
        } else {
            RunStatus::Success
        };

        info!("Consolidation finished with status {:?}", status);
        Ok(ConsolidationResult { markdown, status })
    }

    /// One LLM call, retried once with backoff on any failure
    async fn complete_with_retry(&self, prompt: &str) -> Result<String, ConsolidateError> {
        match self
            .client
            .complete(prompt, &self.model, self.max_output_tokens)
            .await
        {
            Ok(text) => Ok(text),
            Err(first) => {
                warn!("LLM call failed ({}), retrying once", first);
                tokio::time::sleep(self.retry_backoff).await;
                self.client
                    .complete(prompt, &self.model, self.max_output_tokens)
                    .await
                    .map_err(ConsolidateError::Llm)
            }
        }
    }
}

/// Placeholder fragment noting which sources could not be consolidated
fn placeholder(records: &[PageRecord]) -> String {
    let sources = records
        .iter()
        .map(|r| format!("- {} ({})", r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "> **Note:** content from {} page(s) was omitted because consolidation failed:\n{}",
        records.len(),
        sources
    )
}

fn fragment_record(text: String) -> PageRecord {
    PageRecord {
        url: String::new(),
        title: String::new(),
        text,
        links: Vec::new(),
        depth: 0,
        used_fallback: false,
        truncated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per whitespace-separated word, deterministic for tests
    struct WordEstimator;

    impl TokenEstimator for WordEstimator {
        fn estimate(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    fn record(url: &str, words: usize) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: format!("Page {url}"),
            text: vec!["word"; words].join(" "),
            links: Vec::new(),
            depth: 0,
            used_fallback: false,
            truncated: false,
        }
    }

    fn consolidator(server: &mockito::Server, limit: usize) -> Consolidator<WordEstimator> {
        let client = LlmClient::new("test-key", server.url());
        Consolidator::new(client, "test-model", limit, WordEstimator)
            .with_retry_backoff(Duration::from_millis(10))
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_single_partition_single_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("# The Document"))
            .expect(1)
            .create_async()
            .await;

        let result = consolidator(&server, 1000)
            .consolidate(vec![record("a", 10), record("b", 10)])
            .await
            .unwrap();

        assert_eq!(result.markdown, "# The Document");
        assert_eq!(result.status, RunStatus::Success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_multiple_partitions_are_merged() {
        let mut server = mockito::Server::new_async().await;
        // two partition calls plus one merge call
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("fragment"))
            .expect(3)
            .create_async()
            .await;

        let result = consolidator(&server, 15)
            .consolidate(vec![record("a", 10), record("b", 10)])
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.markdown, "fragment");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_partition_becomes_placeholder_and_status_partial() {
        let mut server = mockito::Server::new_async().await;
        // First partition: initial call + retry both fail.
        let failing = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .expect(2)
            .create_async()
            .await;
        // Second partition and the merge call succeed.
        let succeeding = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("merged output"))
            .expect(2)
            .create_async()
            .await;

        let result = consolidator(&server, 40)
            .consolidate(vec![record("a", 30), record("b", 30)])
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Partial);
        assert!(!result.markdown.is_empty());
        failing.assert_async().await;
        succeeding.assert_async().await;
    }

    #[tokio::test]
    async fn test_all_partitions_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("down")
            .expect_at_least(2)
            .create_async()
            .await;

        let result = consolidator(&server, 15)
            .consolidate(vec![record("a", 10), record("b", 10)])
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        // placeholders still name the omitted sources
        assert!(result.markdown.contains("omitted"));
        assert!(result.markdown.contains("Page a"));
        assert!(result.markdown.contains("Page b"));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_an_error() {
        let server = mockito::Server::new_async().await;
        let result = consolidator(&server, 100).consolidate(Vec::new()).await;
        assert!(matches!(result, Err(ConsolidateError::EmptyCorpus)));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("hiccup")
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("# Recovered"))
            .expect(1)
            .create_async()
            .await;

        let result = consolidator(&server, 1000)
            .consolidate(vec![record("a", 10)])
            .await
            .unwrap();

        assert_eq!(result.markdown, "# Recovered");
        assert_eq!(result.status, RunStatus::Success);
        first.assert_async().await;
        second.assert_async().await;
    }
}
