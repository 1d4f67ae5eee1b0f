//! Ollama LLM implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::{
        chat::{request::ChatMessageRequest, ChatMessage},
        parameters::FormatType,
    },
    models::ModelOptions,
    Ollama,
};

use super::{CallOptions, Completion, Llm, Message, Role, TokenUsage};

/// Default Ollama port when the URL has none
const DEFAULT_PORT: u16 = 11434;

/// Ollama client wrapper
pub struct OllamaClient {
    client: Ollama,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client against `base_url` (e.g. `http://localhost:11434`)
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let mut url = url::Url::parse(base_url)
            .with_context(|| format!("invalid Ollama URL '{}'", base_url))?;

        // Only a plain http URL without a port falls back to Ollama's port
        if url.scheme() == "http" && url.port().is_none() {
            url.set_port(Some(DEFAULT_PORT)).map_err(|_| {
                anyhow::anyhow!("Ollama URL '{}' cannot have a port", base_url)
            })?;
        }

        Ok(Self {
            client: Ollama::from_url(url),
            model: model.to_string(),
            temperature: None,
        })
    }

    /// Set the default sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Base URL requests are sent to
    pub fn url(&self) -> &url::Url {
        self.client.url()
    }

    fn build_request(&self, messages: &[Message], options: &CallOptions) -> ChatMessageRequest {
        let model = options.model.clone().unwrap_or_else(|| self.model.clone());

        let messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::system(m.content.clone()),
                Role::User => ChatMessage::user(m.content.clone()),
                Role::Assistant => ChatMessage::assistant(m.content.clone()),
            })
            .collect();

        let mut request = ChatMessageRequest::new(model, messages);
        if let Some(temperature) = options.temperature.or(self.temperature) {
            request = request.options(ModelOptions::default().temperature(temperature));
        }
        if options.json {
            request = request.format(FormatType::Json);
        }
        request
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn complete(&self, messages: &[Message], options: &CallOptions) -> Result<Completion> {
        let request = self.build_request(messages, options);
        tracing::debug!("Ollama chat (model: {})", request.model_name);
        let response = self.client.send_chat_messages(request).await?;

        let usage = response
            .final_data
            .as_ref()
            .map(|data| TokenUsage {
                prompt_tokens: data.prompt_eval_count,
                completion_tokens: data.eval_count,
            })
            .unwrap_or_default();

        Ok(Completion {
            content: response.message.content,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
