//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OllamaEmbedder`: local inference server
/// - `HostedEmbedder`: hosted OpenAI-compatible API
///
/// All vectors returned under one provider configuration share a single
/// fixed dimensionality; a mismatch against stored data is a fatal
/// configuration error for the caller, not a retryable one.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    ///
    /// The returned sequence has the same length and order as the input,
    /// regardless of how the backend executes the calls. The default
    /// implementation calls `embed` sequentially; variants with native
    /// batch support should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensionality for this configuration
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
