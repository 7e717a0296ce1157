//! Configuration for the RAG pipeline
//!
//! Every component takes its configuration explicitly through its
//! constructor so the pipeline can be instantiated with varied settings in
//! parallel test runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main RAG pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Backend provider (local inference server or hosted API)
    #[serde(default)]
    pub backend: BackendKind,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Model backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Hosted API configuration (required when backend = hosted)
    #[serde(default)]
    pub hosted: Option<HostedConfig>,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size_tokens == 0 {
            return Err(Error::config("chunk_size_tokens must be greater than zero"));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("top_k must be greater than zero"));
        }
        Ok(())
    }
}

/// Backend provider selection, decided once at process start
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local inference server (Ollama)
    #[default]
    Local,
    /// Hosted OpenAI-compatible API
    Hosted,
}

/// Token-aware chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in tokens
    #[serde(default = "default_chunk_size_tokens")]
    pub chunk_size_tokens: usize,
    /// Overlap between consecutive windows in tokens
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

fn default_chunk_size_tokens() -> usize {
    800
}

fn default_overlap_tokens() -> usize {
    150
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: default_chunk_size_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of chunks returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    6
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Model backend configuration shared by both provider variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the local inference server
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Embedding model name
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Embedding dimensionality (768 for nomic-embed-text)
    #[serde(default = "default_embed_dimensions")]
    pub embed_dimensions: usize,
    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Generation temperature (kept low for grounded, low-variance output)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embed_dimensions() -> usize {
    768
}

fn default_chat_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            embed_dimensions: default_embed_dimensions(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hosted API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    /// Base URL of the hosted API
    #[serde(default = "default_hosted_base_url")]
    pub base_url: String,
    /// API key; falls back to the `OPENAI_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_hosted_base_url() -> String {
    "https://api.openai.com".to_string()
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosted_base_url(),
            api_key: None,
        }
    }
}

impl HostedConfig {
    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::config(
                "hosted backend selected but no API key configured (set hosted.api_key or OPENAI_API_KEY)",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size_tokens, 800);
        assert_eq!(config.chunking.overlap_tokens, 150);
        assert_eq!(config.retrieval.top_k, 6);
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.backend, BackendKind::Local);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let raw = r#"
            backend = "hosted"

            [retrieval]
            top_k = 3
        "#;
        let config: RagConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.backend, BackendKind::Hosted);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.chunking.chunk_size_tokens, 800);
    }
}
