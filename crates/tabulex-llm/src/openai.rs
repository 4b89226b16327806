//! OpenAI chat-completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, classify_status, key_from_env};
use crate::{ChatModel, Completion, Message, Usage};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const AUTH_ENV_VAR: &str = "OPENAI_API_KEY";

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            url: API_URL.to_string(),
        }
    }

    /// Read the API key from `OPENAI_API_KEY`.
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
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsageBody {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[async_trait]
impl ChatModel for OpenAiModel {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        debug!(model = %self.model, messages = messages.len(), "openai completion request");
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let text = resp.text().await?;
        let body: ChatResponse = serde_json::from_str(&text)?;
        let choice = body.choices.into_iter().next().ok_or_else(|| {
            ModelError::Provider {
                status: status.as_u16(),
                body: "response carried no choices".into(),
            }
        })?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".into()),
            usage: body
                .usage
                .map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_openai_shape() {
        let messages = vec![Message::user("請填表")];
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: 0.0,
            max_tokens: 2048,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "請填表");
        assert_eq!(json["max_tokens"], 2048);
    }

    #[test]
    fn response_decodes() {
        let text = r#"{
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "| L1 |\n|----|\n| TRUE |"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 15, "total_tokens": 135}
        }"#;
        let body: ChatResponse = serde_json::from_str(text).unwrap();
        let choice = &body.choices[0];
        assert!(choice.message.content.as_deref().unwrap().starts_with("| L1 |"));
        assert_eq!(body.usage.unwrap().total_tokens, 135);
    }

    #[test]
    fn response_with_null_content_decodes_to_none() {
        let text = r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"length"}]}"#;
        let body: ChatResponse = serde_json::from_str(text).unwrap();
        assert!(body.choices[0].message.content.is_none());
        assert!(body.usage.is_none());
    }
}
