//! LLM correction pass for parsed sign records.
//!
//! Sends the parser's records to an OpenAI-compatible chat-completion endpoint
//! with MUTCD reconciliation instructions and reads back a corrected list.

mod config;
mod prompts;

use crate::record::SignRecord;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use config::{CorrectionConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Why a correction attempt produced no records.
#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("correction is disabled (no API key configured)")]
    Disabled,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("API returned HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),

    #[error("completion is not a JSON array of records: {0}")]
    Parse(String),
}

/// Client for the correction endpoint.
pub struct CorrectionClient {
    config: CorrectionConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

impl CorrectionClient {
    pub fn new(config: CorrectionConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_active()
    }

    /// Ask the model for a corrected record list.
    ///
    /// Makes exactly one request. The returned list replaces the input
    /// wholesale; it may differ in length.
    pub async fn correct(&self, records: &[SignRecord]) -> Result<Vec<SignRecord>, CorrectionError> {
        let api_key = match (&self.config.api_key, self.config.enabled) {
            (Some(key), true) => key,
            _ => return Err(CorrectionError::Disabled),
        };

        let payload = serde_json::to_string(records)
            .map_err(|e| CorrectionError::Parse(e.to_string()))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &payload,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            "Sending {} records to {} ({})",
            records.len(),
            self.config.endpoint,
            self.config.model
        );

        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CorrectionError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CorrectionError::Api { status, body });
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CorrectionError::MalformedResponse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CorrectionError::MalformedResponse("no completion content".to_string()))?;

        debug!("Correction response: {}", content);

        let corrected = parse_completion(&content)?;
        info!(
            "Correction returned {} records (sent {})",
            corrected.len(),
            records.len()
        );
        Ok(corrected)
    }
}

/// Parse the model's text as a record array, tolerating a Markdown code fence.
pub fn parse_completion(content: &str) -> Result<Vec<SignRecord>, CorrectionError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| CorrectionError::Parse(e.to_string()))
}

/// Remove a surrounding ```` ```json ```` / ```` ``` ```` fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
