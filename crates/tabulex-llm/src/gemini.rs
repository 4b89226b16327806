//! Gemini generateContent backend.
//!
//! Role-tagged messages are flattened into one `[System]/[User]/[Assistant]`
//! prompt instead of being mapped onto Gemini's multi-turn `contents`; the
//! single-call prompts this system sends have one user turn anyway. Safety
//! settings are relaxed to BLOCK_ONLY_HIGH because legal rulings describe
//! violent offences and default thresholds refuse them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, classify_status};
use crate::{ChatModel, Completion, Message, Role, Usage};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const AUTH_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Read the API key from `GOOGLE_API_KEY`, falling back to
    /// `GEMINI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ModelError> {
        let key = AUTH_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .ok_or_else(|| {
                ModelError::Auth(format!("neither {} nor {} is set", AUTH_ENV_VARS[0], AUTH_ENV_VARS[1]))
            })?;
        Ok(Self::new(key, model))
    }

    /// Override the endpoint base URL (test servers, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Flatten role-tagged messages into a single tagged prompt.
fn flatten_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let tag = match m.role {
                Role::System => "[System]",
                Role::User => "[User]",
                Role::Assistant => "[Assistant]",
            };
            format!("{tag}\n{}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

fn relaxed_safety_settings() -> Vec<SafetySetting> {
    const CATEGORIES: [&str; 3] = [
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
    ];
    CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_ONLY_HIGH",
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

#[async_trait]
impl ChatModel for GeminiModel {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, ModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: flatten_messages(messages),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            },
            safety_settings: relaxed_safety_settings(),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        debug!(model = %self.model, messages = messages.len(), "gemini completion request");
        let resp = self.client.post(&url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let text = resp.text().await?;
        let body: GenerateResponse = serde_json::from_str(&text)?;
        let candidate = body.candidates.into_iter().next();
        let content = candidate
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(Completion {
            content,
            finish_reason: candidate
                .and_then(|c| c.finish_reason)
                .unwrap_or_else(|| "STOP".into()),
            usage: body
                .usage_metadata
                .map(|u| Usage {
                    prompt_tokens: u.prompt_token_count,
                    completion_tokens: u.candidates_token_count,
                    total_tokens: u.total_token_count,
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
    fn flattens_roles_into_tagged_prompt() {
        let messages = vec![Message::system("你是法律助理"), Message::user("請填表")];
        let prompt = flatten_messages(&messages);
        assert_eq!(prompt, "[System]\n你是法律助理\n\n[User]\n請填表");
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "[User]\nhi".into(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 2048,
            },
            safety_settings: relaxed_safety_settings(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "[User]\nhi");
    }

    #[test]
    fn response_decodes() {
        let text = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "| L1 |"}, {"text": "\n| TRUE |"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 90, "candidatesTokenCount": 8, "totalTokenCount": 98}
        }"#;
        let body: GenerateResponse = serde_json::from_str(text).unwrap();
        let parts: String = body.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(parts, "| L1 |\n| TRUE |");
        assert_eq!(body.usage_metadata.unwrap().total_token_count, 98);
    }

    #[test]
    fn blocked_response_decodes_to_empty_content() {
        // A safety-blocked candidate carries no content.
        let text = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let body: GenerateResponse = serde_json::from_str(text).unwrap();
        assert!(body.candidates[0].content.is_none());
        assert_eq!(body.candidates[0].finish_reason.as_deref(), Some("SAFETY"));
    }
}
