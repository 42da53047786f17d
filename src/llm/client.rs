//! HTTP client for OpenAI-compatible chat-completion APIs

use std::time::Duration;

use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Default timeout for LLM requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Sampling temperature for consolidation: low, for focused output
const TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "You are a technical documentation expert.";

/// Error type for LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    /// Create a client against the given API base URL (e.g.
    /// `https://api.openai.com/v1`).
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Request a single chat completion and return the response text.
    pub async fn complete(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending completion request to {} (model {})", url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(2);
            return Err(LlmError::RateLimit {
                retry_after_secs: retry_after,
            });
        }

        let response_text = response.text().await?;
        if !status.is_success() {
            error!("API error: {} - {}", status, response_text);
            return if status == StatusCode::UNAUTHORIZED {
                Err(LlmError::Auth("Invalid API key or credentials".to_string()))
            } else {
                Err(LlmError::Api {
                    status_code: status.as_u16(),
                    message: response_text,
                })
            };
        }

        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse response: {}", e);
            LlmError::UnexpectedResponse(format!("Failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::UnexpectedResponse("Response contained no choices".to_string()))
    }
}
