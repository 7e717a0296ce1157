//! Local inference server (Ollama) providers for embeddings and chat
//!
//! One `OllamaClient` is shared between the embedding and generation
//! providers. The client performs no automatic retries; retry policy belongs
//! to the enclosing service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::EMPTY_COMPLETION_FALLBACK;
use crate::types::ChatMessage;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

const PROVIDER_NAME: &str = "ollama";

/// HTTP client for the Ollama API
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Generate an embedding for a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint("/api/embed");
        let request = EmbedRequest {
            model: &self.config.embed_model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider_unavailable(
                PROVIDER_NAME,
                format!("embedding request failed ({}): {}", status, body),
            ));
        }

        let payload: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::malformed_response(PROVIDER_NAME, e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(Error::provider_unavailable(PROVIDER_NAME, error));
        }

        payload
            .embeddings
            .and_then(|mut vectors| {
                if vectors.is_empty() {
                    None
                } else {
                    Some(vectors.remove(0))
                }
            })
            .ok_or_else(|| {
                Error::malformed_response(PROVIDER_NAME, "response missing embeddings field")
            })
    }

    /// Run a chat completion
    pub async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let url = self.endpoint("/api/chat");
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            stream: false,
            options: ChatOptions { temperature },
        };

        tracing::debug!(model = %self.config.chat_model, "requesting chat completion");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation_unavailable(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation_unavailable(
                PROVIDER_NAME,
                format!("chat request failed ({}): {}", status, body),
            ));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::malformed_response(PROVIDER_NAME, e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(Error::generation_unavailable(PROVIDER_NAME, error));
        }

        // A 2xx response with nothing to say is not a failure: substitute
        // the fixed fallback so callers can distinguish it from an outage.
        let answer = payload
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string());

        Ok(answer)
    }
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    // Sequential fallback: the backend embeds one input at a time, so the
    // default trait implementation already preserves input order.

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Ollama chat provider
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        self.client.chat(messages, temperature).await
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}
