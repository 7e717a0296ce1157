//! Query request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question to answer against the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Restrict retrieval to these documents; empty or absent means all
    /// documents owned by the requesting identity
    #[serde(default)]
    pub document_filter: Option<Vec<Uuid>>,

    /// Include the raw retrieved chunks in the response (default: false)
    #[serde(default)]
    pub include_chunks: bool,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            document_filter: None,
            include_chunks: false,
        }
    }

    /// Restrict retrieval to the given documents
    pub fn with_documents(mut self, doc_ids: Vec<Uuid>) -> Self {
        self.document_filter = Some(doc_ids);
        self
    }

    /// Include raw chunks in the response
    pub fn with_chunks(mut self) -> Self {
        self.include_chunks = true;
        self
    }
}
