//! LLM abstraction layer

#[cfg(feature = "ollama")]
mod ollama;
mod openai;

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{LlmConfig, LlmProvider};

/// Message in a conversation
#[derive(Debug, Clone, PartialEq)]
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
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Model to use instead of the client's default
    pub model: Option<String>,
    pub temperature: Option<f32>,
    /// Ask the backend for a JSON object response
    pub json: bool,
}

/// Tokens consumed by one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Response to one chat call
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// Trait for LLM backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Send a conversation and get the assistant reply
    async fn complete(&self, messages: &[Message], options: &CallOptions) -> Result<Completion>;

    /// Get the default model name
    fn model(&self) -> &str;
}

/// Build the backend selected in config
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Llm>> {
    match config.provider {
        LlmProvider::OpenAi => {
            let client = OpenAiClient::new(config.base_url(), &config.model, config.api_key())?
                .with_temperature(config.temperature);
            Ok(Arc::new(client))
        }
        #[cfg(feature = "ollama")]
        LlmProvider::Ollama => {
            let client = OllamaClient::new(config.base_url(), &config.model)?
                .with_temperature(config.temperature);
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "ollama"))]
        LlmProvider::Ollama => anyhow::bail!("Ollama support requires the 'ollama' feature"),
    }
}
