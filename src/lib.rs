//! # docweave - documentation crawler and consolidator
//!
//! This crate crawls a documentation website starting from a single entry URL,
//! extracts readable text from every in-scope page, and asks a large language
//! model to consolidate the crawled content into one organized markdown
//! document.
//!
//! ## Features
//!
//! - Depth-bounded, same-prefix-restricted breadth-first crawling
//! - Static HTTP fetching with a headless-browser render fallback for
//!   JavaScript-heavy pages
//! - Configurable content extraction (exclude/include CSS selectors)
//! - Token-budget-aware partitioning of the crawled corpus
//! - LLM-driven consolidation against any OpenAI-compatible endpoint
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use docweave::pipeline::{self, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder("https://docs.example.com/guide/")
//!         .max_depth(2)
//!         .output("guide.md")
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     let summary = pipeline::run(config).await?;
//!     println!("crawled {} pages, status {:?}", summary.visited, summary.status);
//!     Ok(())
//! }
//! ```

mod error;

pub mod consolidator;
pub mod crawler;
pub mod llm;
pub mod pipeline;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
