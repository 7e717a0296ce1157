//! Chat completion provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// Trait for LLM-backed answer generation
///
/// Implementations:
/// - `OllamaLlm`: local inference server
/// - `HostedLlm`: hosted OpenAI-compatible API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a chat completion over an ordered message list
    ///
    /// A backend that responds successfully but with an empty payload yields
    /// the literal fallback answer rather than an error; transport and
    /// non-2xx failures surface as `GenerationUnavailable`.
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model used for generation
    fn model(&self) -> &str;
}
