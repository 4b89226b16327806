//! Anthropic messages backend.
//!
//! The messages API takes the system prompt as a top-level field, so any
//! system-role messages are lifted out of the chat turns before sending.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, classify_status, key_from_env};
use crate::{ChatModel, Completion, Message, Role, Usage};

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const AUTH_ENV_VAR: &str = "ANTHROPIC_API_KEY";

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            url: API_URL.to_string(),
        }
    }

    /// Read the API key from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self::new(key_from_env(AUTH_ENV_VAR)?, model))
    }

    /// Override the endpoint URL (test servers, proxies).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a Message>,
}

/// Split system messages from chat turns.
fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let chat: Vec<&Message> = messages.iter().filter(|m| m.role != Role::System).collect();
    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, chat)
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct UsageBody {
    input_tokens: u64,
    output_tokens: u64,
}

#[async_trait]
impl ChatModel for AnthropicModel {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, ModelError> {
        let (system, chat) = split_system(messages);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature,
            system,
            messages: chat,
        };

        debug!(model = %self.model, messages = messages.len(), "anthropic completion request");
        let resp = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let text = resp.text().await?;
        let body: MessagesResponse = serde_json::from_str(&text)?;
        let content = body
            .content
            .first()
            .map(|b| b.text.clone())
            .unwrap_or_default();
        let usage = body
            .usage
            .map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            content,
            finish_reason: body.stop_reason.unwrap_or_else(|| "end_turn".into()),
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
