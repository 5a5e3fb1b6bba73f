//! Vector storage
//!
//! A store keeps `(chunk, embedding)` pairs for one document and answers
//! nearest-neighbour queries over them. Entries keep their insertion order,
//! which decides between chunks that score the same, so results are
//! reproducible for a given document and query.
//!
//! ```ignore
//! use minichat_lib::store::{MemoryStore, VectorStore};
//!
//! let mut store = MemoryStore::new();
//! store.insert(&chunks, &embeddings)?;
//! let nearest = store.search(&query_embedding, 50)?;
//! ```

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::Result;

/// A stored chunk and its cosine similarity to the query (`-1.0..=1.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// Storage backend for chunk embeddings.
pub trait VectorStore: Send + Sync {
    /// Append chunks with their embeddings.
    ///
    /// `chunks` and `embeddings` are parallel slices; a length or dimension
    /// mismatch is rejected with [`crate::Error::Store`] and nothing is added.
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// Up to `k` entries closest to `query_embedding`, best first.
    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<SearchResult>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    fn clear(&mut self);
}

mod memory;

pub use memory::*;
