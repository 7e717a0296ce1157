//! Provider abstractions for embeddings and chat completion
//!
//! Backend selection happens once at process start: `build_providers` reads
//! the configured backend kind and hands back trait objects, so no call
//! site ever branches on the backend again.

pub mod embedding;
pub mod hosted;
pub mod llm;
pub mod ollama;

use std::sync::Arc;

use crate::config::{BackendKind, RagConfig};
use crate::error::{Error, Result};

pub use embedding::EmbeddingProvider;
pub use hosted::{HostedClient, HostedEmbedder, HostedLlm};
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};

/// Build the embedding and generation providers for the configured backend
pub fn build_providers(
    config: &RagConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    match config.backend {
        BackendKind::Local => {
            let client = Arc::new(OllamaClient::new(&config.llm));
            let embedder = OllamaEmbedder::from_client(
                Arc::clone(&client),
                config.llm.embed_dimensions,
            );
            let llm = OllamaLlm::from_client(client, config.llm.chat_model.clone());
            Ok((Arc::new(embedder), Arc::new(llm)))
        }
        BackendKind::Hosted => {
            let hosted = config.hosted.as_ref().ok_or_else(|| {
                Error::config("backend = hosted requires a [hosted] configuration section")
            })?;
            let client = Arc::new(HostedClient::new(&config.llm, hosted)?);
            let embedder = HostedEmbedder::from_client(
                Arc::clone(&client),
                config.llm.embed_dimensions,
            );
            let llm = HostedLlm::from_client(client, config.llm.chat_model.clone());
            Ok((Arc::new(embedder), Arc::new(llm)))
        }
    }
}
