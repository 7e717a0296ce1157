//! Token-aware text chunking with overlap
//!
//! Windows are measured in cl100k_base tokens. The vocabulary is vendored
//! by tiktoken-rs, so boundaries are stable across runs and machines; no
//! compatibility with any particular generation model is required, only
//! determinism.

use tiktoken_rs::CoreBPE;

use crate::error::{Error, Result};

/// A chunk produced by the chunker, before page assignment and embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDraft {
    /// Decoded, trimmed window text
    pub content: String,
    /// Start of the token window (inclusive)
    pub token_start: usize,
    /// End of the token window (exclusive)
    pub token_end: usize,
    /// Zero-based emission order
    pub chunk_index: u32,
}

/// Token-window chunker with configurable size and overlap
pub struct TokenChunker {
    bpe: CoreBPE,
    chunk_size: usize,
    overlap: usize,
}

impl TokenChunker {
    /// Create a new chunker
    ///
    /// `chunk_size` must be non-zero. `overlap >= chunk_size` is accepted
    /// but degrades to a single chunk (see [`TokenChunker::chunk`]).
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::internal(format!("failed to load cl100k_base vocabulary: {}", e)))?;
        Ok(Self {
            bpe,
            chunk_size,
            overlap,
        })
    }

    /// Split text into overlapping token windows
    ///
    /// The start offset advances by `chunk_size - overlap` each iteration;
    /// the final window is clipped to the text length. When
    /// `overlap >= chunk_size` the step would not advance, so exactly one
    /// chunk is produced rather than looping.
    pub fn chunk(&self, text: &str) -> Result<Vec<ChunkDraft>> {
        let tokens = self.bpe.encode_ordinary(text);
        let total = tokens.len();

        let mut chunks = Vec::new();
        let mut token_start = 0usize;
        let mut chunk_index = 0u32;

        while token_start < total {
            let token_end = (token_start + self.chunk_size).min(total);
            let window = tokens[token_start..token_end].to_vec();
            let decoded = self
                .bpe
                .decode(window)
                .map_err(|e| Error::internal(format!("token window decode failed: {}", e)))?;

            chunks.push(ChunkDraft {
                content: decoded.trim().to_string(),
                token_start,
                token_end,
                chunk_index,
            });

            chunk_index += 1;

            if self.overlap >= self.chunk_size {
                break;
            }
            token_start += self.chunk_size - self.overlap;
        }

        tracing::debug!(
            total_tokens = total,
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "chunked text"
        );

        Ok(chunks)
    }

    /// Number of tokens the chunker would see for `text`
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}
