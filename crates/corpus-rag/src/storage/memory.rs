//! In-memory chunk store
//!
//! Reference implementation and test double: brute-force cosine distance
//! over all stored vectors behind `parking_lot` locks.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

use super::{cosine_distance, rank_candidates, ChunkStore, ScoredChunk, SimilarityQuery};

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn insert_document(&self, document: &Document) -> Result<()> {
        self.documents
            .write()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, document_id: &Uuid) -> Result<Option<Document>> {
        Ok(self.documents.read().get(document_id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self.documents.read().values().cloned().collect();
        documents.sort_by_key(|d| (d.created_at, d.id));
        Ok(documents)
    }

    async fn delete_document(&self, document_id: &Uuid) -> Result<usize> {
        self.documents.write().remove(document_id);
        let mut chunks = self.chunks.write();
        let before = chunks.len();
        chunks.retain(|c| c.document_id != *document_id);
        Ok(before - chunks.len())
    }

    async fn insert_chunks(&self, new_chunks: &[Chunk]) -> Result<()> {
        let mut chunks = self.chunks.write();
        let expected = chunks
            .first()
            .map(|c| c.embedding.len())
            .or_else(|| new_chunks.first().map(|c| c.embedding.len()));

        for chunk in new_chunks {
            if chunk.embedding.is_empty() {
                return Err(Error::storage(format!(
                    "chunk {} has no embedding",
                    chunk.id
                )));
            }
            if let Some(dims) = expected {
                if chunk.embedding.len() != dims {
                    return Err(Error::config(format!(
                        "embedding dimensionality mismatch: store holds {}-dim vectors, chunk {} has {}",
                        dims,
                        chunk.id,
                        chunk.embedding.len()
                    )));
                }
            }
        }

        chunks.extend(new_chunks.iter().cloned());
        Ok(())
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<ScoredChunk>> {
        let documents = self.documents.read();
        let chunks = self.chunks.read();

        let filter = query
            .document_filter
            .as_deref()
            .filter(|ids| !ids.is_empty());

        let candidates: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|chunk| match filter {
                Some(ids) => ids.contains(&chunk.document_id),
                None => true,
            })
            .filter_map(|chunk| {
                // Orphaned vectors are never surfaced
                let document = documents.get(&chunk.document_id)?;
                Some(ScoredChunk {
                    distance: cosine_distance(&query.vector, &chunk.embedding),
                    document_title: document.title.clone(),
                    chunk: chunk.clone(),
                })
            })
            .collect();

        Ok(rank_candidates(candidates, query.limit))
    }

    async fn chunk_count(&self) -> Result<usize> {
        Ok(self.chunks.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_document(title: &str) -> Document {
        Document::new(title, "text/plain", "demo-user-1")
    }

    fn make_chunk(doc: &Document, index: u32, embedding: Vec<f32>) -> Chunk {
        Chunk::new(
            doc.id,
            index,
            format!("content {}", index),
            (index as usize) * 10,
            (index as usize) * 10 + 10,
            None,
            embedding,
        )
    }

    #[tokio::test]
    async fn empty_store_returns_empty_results() {
        let store = MemoryStore::new();
        let results = store
            .similarity_search(&SimilarityQuery {
                vector: vec![1.0, 0.0],
                limit: 5,
                document_filter: None,
            })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn ranks_by_distance_then_index_then_document() {
        let store = MemoryStore::new();
        let doc_a = make_document("A");
        let doc_b = make_document("B");
        store.insert_document(&doc_a).await.unwrap();
        store.insert_document(&doc_b).await.unwrap();

        // Chunk 0 of A is an exact match; chunks 1 of A and 1 of B tie.
        store
            .insert_chunks(&[
                make_chunk(&doc_a, 0, vec![1.0, 0.0]),
                make_chunk(&doc_a, 1, vec![0.0, 1.0]),
                make_chunk(&doc_b, 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store
            .similarity_search(&SimilarityQuery {
                vector: vec![1.0, 0.0],
                limit: 10,
                document_filter: None,
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.chunk_index, 0);
        assert_eq!(results[1].chunk.chunk_index, 1);
        assert_eq!(results[2].chunk.chunk_index, 1);
        // Tied chunks are ordered by document id
        assert!(results[1].chunk.document_id <= results[2].chunk.document_id);
    }

    #[tokio::test]
    async fn document_filter_restricts_results() {
        let store = MemoryStore::new();
        let doc_a = make_document("A");
        let doc_b = make_document("B");
        store.insert_document(&doc_a).await.unwrap();
        store.insert_document(&doc_b).await.unwrap();
        store
            .insert_chunks(&[
                make_chunk(&doc_a, 0, vec![1.0, 0.0]),
                make_chunk(&doc_b, 0, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store
            .similarity_search(&SimilarityQuery {
                vector: vec![1.0, 0.0],
                limit: 10,
                document_filter: Some(vec![doc_b.id]),
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.document_id, doc_b.id);

        // An empty allow-list means "all documents", not "none"
        let results = store
            .similarity_search(&SimilarityQuery {
                vector: vec![1.0, 0.0],
                limit: 10,
                document_filter: Some(Vec::new()),
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn delete_document_cascades_to_chunks() {
        let store = MemoryStore::new();
        let doc = make_document("A");
        store.insert_document(&doc).await.unwrap();
        store
            .insert_chunks(&[
                make_chunk(&doc, 0, vec![1.0, 0.0]),
                make_chunk(&doc, 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let removed = store.delete_document(&doc.id).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
        assert!(store.get_document(&doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_mixed_dimensionality() {
        let store = MemoryStore::new();
        let doc = make_document("A");
        store.insert_document(&doc).await.unwrap();
        store
            .insert_chunks(&[make_chunk(&doc, 0, vec![1.0, 0.0])])
            .await
            .unwrap();

        let result = store
            .insert_chunks(&[make_chunk(&doc, 1, vec![1.0, 0.0, 0.0])])
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
