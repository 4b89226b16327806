//! LLM layer: one chat-completion contract, three interchangeable backends.
//!
//! Callers hold a `dyn ChatModel` and never branch on provider identity.
//! Output is free text and must be treated as non-deterministic even at
//! temperature 0.0 — providers do not guarantee determinism.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod anthropic;
mod error;
pub mod gemini;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicModel;
pub use error::ModelError;
pub use gemini::GeminiModel;
pub use openai::OpenAiModel;
pub use retry::complete_with_retry;

/// Message role in a chat-style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
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

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token usage counters. Zero when the provider omits them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Generated text plus metadata from one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// May be empty — providers can legally return nothing.
    pub content: String,
    pub finish_reason: String,
    pub usage: Usage,
}

/// Uniform chat-completion contract over the provider backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, ModelError>;

    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let msg = Message::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
        assert_eq!(
            serde_json::to_string(&Role::System).unwrap(),
            r#""system""#
        );
    }
}
