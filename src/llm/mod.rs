//! LLM client module
//!
//! A thin client for OpenAI-compatible chat-completion endpoints, used by the
//! consolidator. The base URL is configurable so local inference servers (and
//! tests) can stand in for the hosted API.

mod client;

pub use client::{LlmClient, LlmError};
