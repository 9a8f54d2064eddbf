//! Generative engine boundary
//!
//! Chat-completions client for a local inference server (llama.cpp
//! style). Serves both the grammar-constrained function-call tier and
//! the conversational fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Generative engine boundary
#[async_trait]
pub trait GenerativeEngine: Send + Sync {
    /// Generate a completion for the prompt under the given system
    /// message; `json_only` constrains decoding to a JSON object
    ///
    /// # Errors
    ///
    /// Returns error if the engine is unreachable or rejects the request
    async fn generate(&self, system: &str, prompt: &str, json_only: bool) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// HTTP client for a local OpenAI-compatible chat-completions server
pub struct HttpChatCompletion {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpChatCompletion {
    /// Create a client for the given server and model
    #[must_use]
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeEngine for HttpChatCompletion {
    async fn generate(&self, system: &str, prompt: &str, json_only: bool) -> Result<String> {
        tracing::debug!(chars = prompt.len(), json_only, "starting generation");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.2,
            response_format: json_only.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "generation request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "generation server error");
            return Err(Error::Generative(format!(
                "generation server error {status}: {body}"
            )));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse generation response");
            e
        })?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generative("empty choices in generation response".to_string()))?;

        tracing::debug!(chars = content.len(), "generation complete");
        Ok(content)
    }
}
