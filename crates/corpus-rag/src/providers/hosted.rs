//! Hosted OpenAI-compatible API providers for embeddings and chat
//!
//! Unlike the local backend, the hosted embeddings endpoint accepts a whole
//! batch in one request. Results are reassembled by the response `index`
//! field, so input order is preserved even if the backend reorders its
//! output. No automatic retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{HostedConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::generation::EMPTY_COMPLETION_FALLBACK;
use crate::types::ChatMessage;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

const PROVIDER_NAME: &str = "hosted";

/// HTTP client for an OpenAI-compatible API
pub struct HostedClient {
    client: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    chat_model: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Option<Vec<EmbeddingItem>>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl HostedClient {
    /// Create a new hosted API client
    ///
    /// Fails with a configuration error when no API key is available.
    pub fn new(llm: &LlmConfig, hosted: &HostedConfig) -> Result<Self> {
        let api_key = hosted.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            base_url: hosted.base_url.trim_end_matches('/').to_string(),
            api_key,
            embed_model: llm.embed_model.clone(),
            chat_model: llm.chat_model.clone(),
        })
    }

    /// Embed a batch of texts in one request, order-preserving
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider_unavailable(
                PROVIDER_NAME,
                format!("embeddings request failed ({}): {}", status, body),
            ));
        }

        let payload: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::malformed_response(PROVIDER_NAME, e.to_string()))?;

        let items = payload.data.ok_or_else(|| {
            Error::malformed_response(PROVIDER_NAME, "response missing data field")
        })?;

        if items.len() != texts.len() {
            return Err(Error::malformed_response(
                PROVIDER_NAME,
                format!("expected {} embeddings, got {}", texts.len(), items.len()),
            ));
        }

        // Reassemble by the index field rather than arrival order
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for item in items {
            let slot = vectors.get_mut(item.index).ok_or_else(|| {
                Error::malformed_response(
                    PROVIDER_NAME,
                    format!("embedding index {} out of range", item.index),
                )
            })?;
            *slot = Some(item.embedding);
        }

        vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| {
                    Error::malformed_response(
                        PROVIDER_NAME,
                        format!("missing embedding for input {}", i),
                    )
                })
            })
            .collect()
    }

    /// Run a chat completion
    pub async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.chat_model,
            messages,
            temperature,
        };

        tracing::debug!(model = %self.chat_model, "requesting chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::malformed_response(PROVIDER_NAME, e.to_string()))?;

        let answer = payload
            .choices
            .and_then(|mut choices| {
                if choices.is_empty() {
                    None
                } else {
                    choices.remove(0).message.and_then(|m| m.content)
                }
            })
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string());

        Ok(answer)
    }
}

/// Hosted API embedding provider
pub struct HostedEmbedder {
    client: Arc<HostedClient>,
    dimensions: usize,
}

impl HostedEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<HostedClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for HostedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.client.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            Error::malformed_response(PROVIDER_NAME, "response missing embedding")
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Hosted API chat provider
pub struct HostedLlm {
    client: Arc<HostedClient>,
    model: String,
}

impl HostedLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<HostedClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for HostedLlm {
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
