//! SQLite-backed chunk store
//!
//! Documents and chunks live in two tables with `ON DELETE CASCADE` from
//! chunk to document. Embeddings are stored as little-endian `f32` BLOBs;
//! distance is computed in Rust over the candidate rows, so the ranking
//! contract is identical to the in-memory store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

use super::{cosine_distance, rank_candidates, ChunkStore, ScoredChunk, SimilarityQuery};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    mime_type    TEXT NOT NULL,
    storage_path TEXT,
    owner        TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id          TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    chunk_index INTEGER NOT NULL,
    content     TEXT NOT NULL,
    token_start INTEGER NOT NULL,
    token_end   INTEGER NOT NULL,
    page        INTEGER,
    embedding   BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
";

/// SQLite store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn stored_dimensions(conn: &Connection) -> Result<Option<usize>> {
        let bytes: Option<i64> = conn
            .query_row("SELECT LENGTH(embedding) FROM chunks LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(bytes.map(|b| b as usize / std::mem::size_of::<f32>()))
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::storage(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect())
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::from_str(raw).map_err(|e| Error::storage(format!("invalid uuid '{}': {}", raw, e)))
}

type DocumentRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    chrono::DateTime<chrono::Utc>,
);

fn read_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn document_from_row(row: DocumentRow) -> Result<Document> {
    let (id, title, mime_type, storage_path, owner, created_at) = row;
    Ok(Document {
        id: parse_uuid(&id)?,
        title,
        mime_type,
        storage_path: storage_path.map(Into::into),
        owner,
        created_at,
    })
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn insert_document(&self, document: &Document) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (id, title, mime_type, storage_path, owner, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                document.id.to_string(),
                document.title,
                document.mime_type,
                document
                    .storage_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
                document.owner,
                document.created_at,
            ],
        )?;
        Ok(())
    }

    async fn get_document(&self, document_id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, title, mime_type, storage_path, owner, created_at
                 FROM documents WHERE id = ?1",
                params![document_id.to_string()],
                read_document_row,
            )
            .optional()?;

        row.map(document_from_row).transpose()
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, mime_type, storage_path, owner, created_at
             FROM documents ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], read_document_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(document_from_row(row?)?);
        }
        Ok(documents)
    }

    async fn delete_document(&self, document_id: &Uuid) -> Result<usize> {
        let conn = self.conn.lock();
        let id = document_id.to_string();
        let chunk_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(chunk_count as usize)
    }

    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        let stored_dims = Self::stored_dimensions(&conn)?;
        let expected = stored_dims.unwrap_or(chunks[0].embedding.len());

        for chunk in chunks {
            if chunk.embedding.is_empty() {
                return Err(Error::storage(format!(
                    "chunk {} has no embedding",
                    chunk.id
                )));
            }
            if chunk.embedding.len() != expected {
                return Err(Error::config(format!(
                    "embedding dimensionality mismatch: store holds {}-dim vectors, chunk {} has {}",
                    expected,
                    chunk.id,
                    chunk.embedding.len()
                )));
            }
        }

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks
                 (id, document_id, chunk_index, content, token_start, token_end, page, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for chunk in chunks {
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.document_id.to_string(),
                    chunk.chunk_index,
                    chunk.content,
                    chunk.token_start as i64,
                    chunk.token_end as i64,
                    chunk.page,
                    embedding_to_blob(&chunk.embedding),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<ScoredChunk>> {
        let conn = self.conn.lock();

        let filter = query
            .document_filter
            .as_deref()
            .filter(|ids| !ids.is_empty());

        let base = "SELECT c.id, c.document_id, c.chunk_index, c.content,
                           c.token_start, c.token_end, c.page, c.embedding, d.title
                    FROM chunks c
                    JOIN documents d ON c.document_id = d.id";

        let (sql, filter_ids): (String, Vec<String>) = match filter {
            Some(ids) => {
                let placeholders = (1..=ids.len())
                    .map(|i| format!("?{}", i))
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    format!("{} WHERE c.document_id IN ({})", base, placeholders),
                    ids.iter().map(|id| id.to_string()).collect(),
                )
            }
            None => (base.to_string(), Vec::new()),
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(filter_ids.iter()), |row| {
            let id: String = row.get(0)?;
            let document_id: String = row.get(1)?;
            let chunk_index: u32 = row.get(2)?;
            let content: String = row.get(3)?;
            let token_start: i64 = row.get(4)?;
            let token_end: i64 = row.get(5)?;
            let page: Option<u32> = row.get(6)?;
            let blob: Vec<u8> = row.get(7)?;
            let title: String = row.get(8)?;
            Ok((
                id,
                document_id,
                chunk_index,
                content,
                token_start,
                token_end,
                page,
                blob,
                title,
            ))
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (id, document_id, chunk_index, content, token_start, token_end, page, blob, title) =
                row?;
            let embedding = blob_to_embedding(&blob)?;
            let distance = cosine_distance(&query.vector, &embedding);
            candidates.push(ScoredChunk {
                chunk: Chunk {
                    id: parse_uuid(&id)?,
                    document_id: parse_uuid(&document_id)?,
                    chunk_index,
                    content,
                    token_start: token_start as usize,
                    token_end: token_end as usize,
                    page,
                    embedding,
                },
                document_title: title,
                distance,
            });
        }

        Ok(rank_candidates(candidates, query.limit))
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
