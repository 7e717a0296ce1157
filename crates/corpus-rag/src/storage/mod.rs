//! Chunk store seam
//!
//! The store is the external collaborator that owns persistence and the
//! actual distance computation. The pipeline only constructs similarity
//! queries and consumes ranked results; both implementations here rank by
//! exact cosine distance (ANN indexing is outside this crate).

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Chunk, Document};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A similarity query against the store
#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    /// Query embedding
    pub vector: Vec<f32>,
    /// Maximum number of results
    pub limit: usize,
    /// Allow-list of owning documents; empty or absent means all documents
    pub document_filter: Option<Vec<Uuid>>,
}

/// A ranked match from a similarity query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Title of the owning document
    pub document_title: String,
    /// Cosine distance to the query vector, in [0, 2]
    pub distance: f32,
}

/// Trait for document and chunk persistence with similarity search
///
/// Results of `similarity_search` are ordered by ascending distance with a
/// deterministic tie-break: chunk index ascending, then document id
/// ascending. Chunks of a deleted document are never returned.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert a document record
    async fn insert_document(&self, document: &Document) -> Result<()>;

    /// Fetch a document by id
    async fn get_document(&self, document_id: &Uuid) -> Result<Option<Document>>;

    /// List all documents
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Delete a document and all of its chunks; returns the number of
    /// chunks removed
    async fn delete_document(&self, document_id: &Uuid) -> Result<usize>;

    /// Bulk-insert chunks
    ///
    /// Every chunk must carry an embedding whose dimensionality matches the
    /// vectors already stored; a mismatch is a fatal configuration error.
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Rank stored chunks by distance to the query vector
    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<ScoredChunk>>;

    /// Total number of stored chunks
    async fn chunk_count(&self) -> Result<usize>;
}

/// Cosine distance between two vectors, in [0, 2]
///
/// Zero-magnitude vectors are treated as maximally distant rather than
/// producing NaN.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 2.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        return 2.0;
    }
    1.0 - dot / (mag_a * mag_b)
}

/// Order candidates by (distance asc, chunk_index asc, document_id asc) and
/// truncate to the query limit. Shared by both store implementations so the
/// ranking contract cannot drift between them.
pub(crate) fn rank_candidates(mut candidates: Vec<ScoredChunk>, limit: usize) -> Vec<ScoredChunk> {
    candidates.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
            .then_with(|| a.chunk.document_id.cmp(&b.chunk.document_id))
    });
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_distance_of_identical_vectors_is_zero() {
        let v = vec![0.5, 0.5, 0.1];
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn cosine_distance_of_opposite_vectors_is_two() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_maximally_distant() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 2.0);
        assert_eq!(cosine_distance(&[], &[1.0]), 2.0);
    }
}
