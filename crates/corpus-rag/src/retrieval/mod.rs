//! Query embedding and similarity retrieval

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::storage::{ChunkStore, SimilarityQuery};

/// A chunk retrieved for one query, joined with its document title and
/// scored by similarity. Ephemeral: lives only for the duration of one
/// retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk ID
    pub chunk_id: Uuid,
    /// Owning document ID
    pub document_id: Uuid,
    /// Owning document title
    pub document_title: String,
    /// Chunk position within its document
    pub chunk_index: u32,
    /// Chunk text
    pub content: String,
    /// Approximate page number, when known
    pub page: Option<u32>,
    /// Similarity score: `1 - cosine distance`, practically [0, 1] for
    /// normalized embeddings
    pub similarity: f32,
}

/// Retriever: embeds a query and ranks stored chunks against it
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Retrieve the top-k most similar chunks for a query
    ///
    /// An empty result is a legitimate outcome meaning "no grounding
    /// available", not a failure. Embedding errors propagate unchanged.
    /// Ordering is deterministic: similarity descending, ties broken by
    /// chunk index ascending, then document id ascending.
    pub async fn retrieve(
        &self,
        query_text: &str,
        document_filter: Option<&[Uuid]>,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_vector = self.embedder.embed(query_text).await?;

        let matches = self
            .store
            .similarity_search(&SimilarityQuery {
                vector: query_vector,
                limit: self.top_k,
                document_filter: document_filter.map(<[Uuid]>::to_vec),
            })
            .await?;

        tracing::debug!(
            matches = matches.len(),
            top_k = self.top_k,
            filtered = document_filter.is_some(),
            "retrieved chunks"
        );

        Ok(matches
            .into_iter()
            .map(|scored| RetrievedChunk {
                chunk_id: scored.chunk.id,
                document_id: scored.chunk.document_id,
                document_title: scored.document_title,
                chunk_index: scored.chunk.chunk_index,
                content: scored.chunk.content,
                page: scored.chunk.page,
                similarity: 1.0 - scored.distance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{Chunk, Document};
    use async_trait::async_trait;

    /// Deterministic embedder: maps known phrases to fixed unit vectors
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(match text {
                "alpha" => vec![1.0, 0.0],
                "beta" => vec![0.0, 1.0],
                _ => vec![0.7, 0.7],
            })
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    async fn seeded_store() -> (Arc<MemoryStore>, Document, Document) {
        let store = Arc::new(MemoryStore::new());
        let doc_a = Document::new("Alpha", "text/plain", "demo-user-1");
        let doc_b = Document::new("Beta", "text/plain", "demo-user-1");
        store.insert_document(&doc_a).await.unwrap();
        store.insert_document(&doc_b).await.unwrap();
        store
            .insert_chunks(&[
                Chunk::new(doc_a.id, 0, "about alpha".into(), 0, 10, None, vec![1.0, 0.0]),
                Chunk::new(doc_a.id, 1, "more alpha".into(), 8, 18, None, vec![0.9, 0.1]),
                Chunk::new(doc_b.id, 0, "about beta".into(), 0, 10, None, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        (store, doc_a, doc_b)
    }

    #[tokio::test]
    async fn orders_by_descending_similarity() {
        let (store, doc_a, _) = seeded_store().await;
        let retriever = Retriever::new(Arc::new(StubEmbedder), store, 6);

        let results = retriever.retrieve("alpha", None).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].document_id, doc_a.id);
        assert_eq!(results[0].chunk_index, 0);
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
        // Exact match similarity is 1 - 0
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn repeated_calls_are_deterministic() {
        let (store, _, _) = seeded_store().await;
        let retriever = Retriever::new(Arc::new(StubEmbedder), store, 6);

        let first = retriever.retrieve("alpha", None).await.unwrap();
        let second = retriever.retrieve("alpha", None).await.unwrap();
        let ids_first: Vec<_> = first.iter().map(|c| c.chunk_id).collect();
        let ids_second: Vec<_> = second.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids_first, ids_second);
    }

    #[tokio::test]
    async fn respects_top_k() {
        let (store, _, _) = seeded_store().await;
        let retriever = Retriever::new(Arc::new(StubEmbedder), store, 2);
        let results = retriever.retrieve("alpha", None).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn document_filter_scopes_results() {
        let (store, _, doc_b) = seeded_store().await;
        let retriever = Retriever::new(Arc::new(StubEmbedder), store, 6);
        let results = retriever
            .retrieve("alpha", Some(&[doc_b.id]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_title, "Beta");
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty_not_error() {
        let store = Arc::new(MemoryStore::new());
        let retriever = Retriever::new(Arc::new(StubEmbedder), store, 6);
        let results = retriever.retrieve("anything", None).await.unwrap();
        assert!(results.is_empty());
    }
}
