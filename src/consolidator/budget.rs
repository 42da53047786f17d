//! Token budgeting and corpus partitioning
//!
//! Token counts are estimates from a pluggable [`TokenEstimator`]; the corpus
//! is split by greedy bin-packing in crawl order so each partition fits the
//! model's context limit. A single page that alone exceeds the limit is
//! truncated to the largest fitting prefix rather than dropped.

use tracing::{debug, warn};

use crate::crawler::PageRecord;

/// Estimates the token cost of a piece of text.
///
/// Token estimation is inherently approximate; keeping it behind a trait lets
/// tests swap in a deterministic counter.
pub trait TokenEstimator {
    /// Estimated token count for `text`
    fn estimate(&self, text: &str) -> usize;
}

/// Character-count heuristic: roughly four characters per token
#[derive(Debug, Clone, Default)]
pub struct CharEstimator;

impl TokenEstimator for CharEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// A contiguous, budget-respecting slice of the corpus
#[derive(Debug, Clone)]
pub struct Partition {
    /// Pages in corpus order
    pub records: Vec<PageRecord>,

    /// Estimated token total across the records
    pub tokens: usize,
}

/// Split the corpus into ordered partitions each fitting `token_limit`.
///
/// Greedy in corpus order: records accumulate into the current partition
/// while the running total stays within the limit. Records whose own estimate
/// exceeds the limit are truncated in place (flagged and warn-logged) so no
/// page is ever dropped. Concatenating the partitions reproduces the
/// (possibly truncated) corpus exactly.
pub fn partition(
    corpus: Vec<PageRecord>,
    token_limit: usize,
    estimator: &dyn TokenEstimator,
) -> Vec<Partition> {
    let mut partitions = Vec::new();
    let mut current = Vec::new();
    let mut current_tokens = 0usize;

    for mut record in corpus {
        let mut tokens = estimator.estimate(&record.text);

        if tokens > token_limit {
            warn!(
                "Page {} alone exceeds the token limit ({} > {}), truncating",
                record.url, tokens, token_limit
            );
            record.text = truncate_to_budget(&record.text, token_limit, estimator);
            record.truncated = true;
            tokens = estimator.estimate(&record.text);
        }

        if !current.is_empty() && current_tokens + tokens > token_limit {
            partitions.push(Partition {
                records: std::mem::take(&mut current),
                tokens: current_tokens,
            });
            current_tokens = 0;
        }

        current_tokens += tokens;
        current.push(record);
    }

    if !current.is_empty() {
        partitions.push(Partition {
            records: current,
            tokens: current_tokens,
        });
    }

    debug!("Partitioned corpus into {} partition(s)", partitions.len());
    partitions
}

/// Largest prefix of `text`, cut at a char boundary, whose estimate fits the
/// budget
fn truncate_to_budget(text: &str, token_limit: usize, estimator: &dyn TokenEstimator) -> String {
    // Binary search over char counts; estimates are monotonic in practice.
    let chars: Vec<char> = text.chars().collect();
    let mut low = 0usize;
    let mut high = chars.len();

    while low < high {
        let mid = (low + high + 1) / 2;
        let candidate: String = chars[..mid].iter().collect();
        if estimator.estimate(&candidate) <= token_limit {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    chars[..low].iter().collect()
}
