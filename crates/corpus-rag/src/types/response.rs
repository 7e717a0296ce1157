//! Chat message, citation, and response types

use serde::{Deserialize, Serialize};

use crate::generation::NO_CONTEXT_REFUSAL;
use crate::retrieval::RetrievedChunk;

/// Message role in a chat completion request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User turn
    User,
    /// Assistant turn
    Assistant,
}

/// One message in a chat completion request, constructed per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: Role,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A verified citation back to a retrieved source chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Title of the cited document
    pub document_title: String,
    /// Index of the cited chunk within its document
    pub chunk_index: u32,
    /// Page number, when known
    pub page: Option<u32>,
    /// First 150 characters of the chunk content, ellipsis-suffixed
    pub snippet: String,
}

/// Response to a chat query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text
    pub answer: String,
    /// Citations resolved against the retrieved chunks
    pub citations: Vec<Citation>,
    /// Number of chunks retrieved for grounding
    pub chunks_retrieved: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Raw retrieved chunks, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved: Option<Vec<RetrievedChunk>>,
}

impl QueryResponse {
    /// Response for the no-grounding case: a fixed refusal with zero
    /// citations, never an error
    pub fn no_context(processing_time_ms: u64) -> Self {
        Self {
            answer: NO_CONTEXT_REFUSAL.to_string(),
            citations: Vec::new(),
            chunks_retrieved: 0,
            processing_time_ms,
            retrieved: None,
        }
    }
}
