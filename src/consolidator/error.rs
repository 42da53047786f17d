//! Error types for the consolidator module

use thiserror::Error;

use crate::llm::LlmError;

/// Error type for consolidation operations
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// LLM call failed after the retry
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Nothing to consolidate
    #[error("Empty corpus: no pages to consolidate")]
    EmptyCorpus,
}
