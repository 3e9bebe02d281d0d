//! LLM Client — the single point of entry for all model calls in Parley.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! All model interactions go through the `ModelBackend` trait, so routing,
//! answering, follow-ups, and the case-study stages can be exercised in tests
//! with a scripted in-process backend.
//!
//! Every call is attempted exactly once with a bounded timeout. There is no
//! retry/backoff at this layer: callers own the fallback policy, and a timeout
//! is treated like any other call failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Parley.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
/// Per-call HTTP timeout. A timed-out call falls back like any other failure.
const CALL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Message author role, serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message, passed by value through every seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The model backend seam. Implement this to swap the upstream model without
/// touching routing, specialists, follow-ups, or the pipelines.
///
/// Carried in `AppState` as `Arc<dyn ModelBackend>`.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Sends an ordered list of role-tagged messages, returns generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Calls the backend and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON; a fenced
/// ```json block is tolerated and stripped before parsing.
pub async fn complete_json<T: DeserializeOwned>(
    backend: &dyn ModelBackend,
    messages: &[ChatMessage],
) -> Result<T, LlmError> {
    let text = backend.complete(messages).await?;
    let text = strip_json_fences(&text);
    serde_json::from_str(text).map_err(LlmError::Parse)
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct LlmResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The production `ModelBackend` backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(CALL_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl ModelBackend for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        // The Messages API takes system instructions out-of-band: fold system
        // messages into the `system` field, keep the rest in order.
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let turns: Vec<AnthropicMessage<'_>> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| AnthropicMessage {
                role: match m.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                },
                content: &m.content,
            })
            .collect();

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: turns,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        llm_response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A scripted backend that replays queued responses in order.
    /// `Err` entries surface as API errors; an exhausted script does too.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String, String>>>,
    }

    impl ScriptedBackend {
        pub fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                script: Mutex::new(responses.into_iter().collect()),
            }
        }

        pub fn replying(responses: &[&str]) -> Self {
            Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub fn failing(message: &str) -> Self {
            Self::new(vec![Err(message.to_string())])
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            let next = self.script.lock().expect("script lock").pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Api {
                    status: 500,
                    message,
                }),
                None => Err(LlmError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                }),
            }
        }
    }
}
