//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Supported file types for ingestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from a MIME type string
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/pdf" => Self::Pdf,
            "text/plain" => Self::Txt,
            "text/markdown" => Self::Markdown,
            m if m.starts_with("text/") => Self::Txt,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Check if this file type can be ingested
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A document in the corpus
///
/// Immutable once created except for deletion; deleting a document cascades
/// to its chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Title shown in citations (the uploaded filename)
    pub title: String,
    /// MIME type as supplied at upload time
    pub mime_type: String,
    /// Path where the raw file is stored (managed by the upload layer)
    pub storage_path: Option<PathBuf>,
    /// Owning identity
    pub owner: String,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document
    pub fn new(title: impl Into<String>, mime_type: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            mime_type: mime_type.into(),
            storage_path: None,
            owner: owner.into(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Attach the storage path recorded by the upload layer
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }
}

/// A contiguous token-bounded slice of a document, the atomic unit of
/// retrieval
///
/// Created once at ingestion, never mutated, deleted only with its owning
/// document. `token_start < token_end` always holds and chunk indices within
/// one document are `0..n` with no gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Owning document ID
    pub document_id: Uuid,
    /// Zero-based position within the document
    pub chunk_index: u32,
    /// Decoded, trimmed window text
    pub content: String,
    /// Start of the token window within the document's token stream
    pub token_start: usize,
    /// End of the token window (exclusive)
    pub token_end: usize,
    /// Approximate page number (linear interpolation, not layout detection)
    pub page: Option<u32>,
    /// Embedding vector; dimensionality fixed by the active provider
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a new chunk
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_id: Uuid,
        chunk_index: u32,
        content: String,
        token_start: usize,
        token_end: usize,
        page: Option<u32>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            chunk_index,
            content,
            token_start,
            token_end,
            page,
            embedding,
        }
    }
}
