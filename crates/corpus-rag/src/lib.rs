//! corpus-rag: question answering grounded in a private document corpus
//!
//! This crate implements the retrieval-augmentation pipeline behind a
//! document Q&A service: token-aware chunking, embedding generation,
//! similarity retrieval with optional document filters, grounded prompt
//! construction, answer generation, and citation extraction that verifies
//! every cited chunk against what was actually retrieved.
//!
//! The crate is a library; HTTP handling, upload storage, and the ANN index
//! inside the vector store are external collaborators.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::ChatEngine;
pub use ingestion::DocumentIngestor;
pub use retrieval::{RetrievedChunk, Retriever};
pub use types::{
    document::{Chunk, Document, FileType},
    query::QueryRequest,
    response::{ChatMessage, Citation, QueryResponse, Role},
};
