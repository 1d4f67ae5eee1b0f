//! OpenAI-compatible chat completions client

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CallOptions, Completion, Llm, Message, TokenUsage};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Client for `/chat/completions` endpoints (OpenAI, or any compatible server)
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiClient {
    /// Create a new client against `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self> {
        let base = url::Url::parse(base_url)
            .with_context(|| format!("invalid LLM base URL '{}'", base_url))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base.as_str().trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            temperature: None,
        })
    }

    /// Set the default sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Llm for OpenAiClient {
    async fn complete(&self, messages: &[Message], options: &CallOptions) -> Result<Completion> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let request = ChatRequest {
            model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature.or(self.temperature),
            response_format: options.json.then_some(ResponseFormat { kind: "json_object" }),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!("POST {} (model: {})", self.endpoint, model);
        let response = builder.send().await.context("LLM request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error ({}): {}", status, body);
        }

        let response: ChatResponse = response
            .json()
            .await
            .context("Failed to decode LLM response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("LLM response contained no message content"))?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion { content, usage })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
