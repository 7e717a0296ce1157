//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
///
/// Backend errors distinguish the embedding stage (`ProviderUnavailable`)
/// from the generation stage (`GenerationUnavailable`) so a caller can tell
/// which half of the pipeline failed without parsing messages.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (credentials, host, chunk sizes).
    /// Fatal, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding backend unreachable or returned a non-2xx response
    #[error("Embedding backend '{backend}' unavailable: {message}")]
    ProviderUnavailable { backend: String, message: String },

    /// Generation backend unreachable or returned a non-2xx response
    #[error("Generation backend '{backend}' unavailable: {message}")]
    GenerationUnavailable { backend: String, message: String },

    /// Backend returned 2xx but the payload lacked an expected field
    #[error("Malformed response from '{backend}': {message}")]
    MalformedResponse { backend: String, message: String },

    /// File text extraction failed
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// File type not supported for ingestion
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Chunk store error
    #[error("Chunk store error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding-backend error
    pub fn provider_unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a generation-backend error
    pub fn generation_unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a chunk store error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
