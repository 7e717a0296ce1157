//! Document ingestion: extract, chunk, paginate, embed, persist

pub mod chunker;
pub mod extract;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::storage::ChunkStore;
use crate::types::{Chunk, Document, FileType};

pub use chunker::{ChunkDraft, TokenChunker};
pub use extract::{extract_text, ExtractedText};

/// Outcome of ingesting one document
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// The created document
    pub document: Document,
    /// Number of chunks created
    pub chunks_created: usize,
}

/// Assign approximate page numbers to chunk drafts by linear interpolation
/// over the token stream: `page = ceil(token_start / total_tokens *
/// total_pages)`, clamped to `[1, total_pages]`.
///
/// This is an approximation, not layout detection; a chunk spanning a page
/// break is attributed to the page its first token falls on.
pub fn assign_pages(drafts: &[ChunkDraft], total_pages: Option<u32>) -> Vec<Option<u32>> {
    let total_tokens = drafts.last().map(|d| d.token_end).unwrap_or(0);
    let pages = match total_pages {
        Some(p) if p > 0 && total_tokens > 0 => p,
        _ => return vec![None; drafts.len()],
    };

    drafts
        .iter()
        .map(|draft| {
            let ratio = draft.token_start as f64 / total_tokens as f64;
            let page = (ratio * pages as f64).ceil() as u32;
            Some(page.clamp(1, pages))
        })
        .collect()
}

/// Ingestion pipeline: chunk a document's text, embed every chunk, and
/// persist document and chunks together
pub struct DocumentIngestor {
    chunker: TokenChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
}

impl DocumentIngestor {
    /// Create a new ingestor
    pub fn new(
        chunker: TokenChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
        }
    }

    /// Ingest a file from disk
    pub async fn ingest_file(
        &self,
        path: &Path,
        title: impl Into<String>,
        mime_type: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<IngestReport> {
        let mime_type = mime_type.into();
        let extracted = extract_text(path, FileType::from_mime(&mime_type))?;
        let document = Document::new(title, mime_type, owner).with_storage_path(path);
        self.ingest_extracted(document, extracted).await
    }

    /// Ingest already-extracted text
    pub async fn ingest_text(
        &self,
        title: impl Into<String>,
        mime_type: impl Into<String>,
        owner: impl Into<String>,
        text: &str,
        total_pages: Option<u32>,
    ) -> Result<IngestReport> {
        let document = Document::new(title, mime_type, owner);
        self.ingest_extracted(
            document,
            ExtractedText {
                text: text.to_string(),
                total_pages,
            },
        )
        .await
    }

    async fn ingest_extracted(
        &self,
        document: Document,
        extracted: ExtractedText,
    ) -> Result<IngestReport> {
        let drafts = self.chunker.chunk(&extracted.text)?;
        let pages = assign_pages(&drafts, extracted.total_pages);

        tracing::info!(
            document_id = %document.id,
            title = %document.title,
            chunks = drafts.len(),
            "ingesting document"
        );

        let contents: Vec<String> = drafts.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&contents).await?;

        let chunks: Vec<Chunk> = drafts
            .into_iter()
            .zip(pages)
            .zip(embeddings)
            .map(|((draft, page), embedding)| {
                Chunk::new(
                    document.id,
                    draft.chunk_index,
                    draft.content,
                    draft.token_start,
                    draft.token_end,
                    page,
                    embedding,
                )
            })
            .collect();

        self.store.insert_document(&document).await?;
        self.store.insert_chunks(&chunks).await?;

        Ok(IngestReport {
            chunks_created: chunks.len(),
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(index: u32, start: usize, end: usize) -> ChunkDraft {
        ChunkDraft {
            content: format!("chunk {}", index),
            token_start: start,
            token_end: end,
            chunk_index: index,
        }
    }

    #[test]
    fn interpolates_pages_linearly() {
        let drafts = vec![draft(0, 0, 400), draft(1, 300, 700), draft(2, 600, 1000)];
        let pages = assign_pages(&drafts, Some(10));
        // token_start 0 -> ceil(0) clamped up to page 1
        assert_eq!(pages[0], Some(1));
        // 300/1000 * 10 = 3
        assert_eq!(pages[1], Some(3));
        // 600/1000 * 10 = 6
        assert_eq!(pages[2], Some(6));
    }

    #[test]
    fn clamps_to_last_page() {
        let drafts = vec![draft(0, 0, 10), draft(1, 9, 10)];
        let pages = assign_pages(&drafts, Some(2));
        assert_eq!(pages[1], Some(2));
    }

    #[test]
    fn no_page_count_means_no_pages() {
        let drafts = vec![draft(0, 0, 10)];
        assert_eq!(assign_pages(&drafts, None), vec![None]);
        assert_eq!(assign_pages(&drafts, Some(0)), vec![None]);
    }

    #[test]
    fn empty_drafts_yield_empty_pages() {
        assert!(assign_pages(&[], Some(5)).is_empty());
    }
}
