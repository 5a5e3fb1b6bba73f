//! Vector index over one document's chunks
//!
//! Combines an embedder and a store. The index is built once from a complete
//! chunk set and is read-only afterwards: a new document means a new index.
//!
//! # Usage
//!
//! ```ignore
//! use minichat_lib::index::VectorIndex;
//!
//! let index = VectorIndex::build(HashEmbedder::default(), &chunks)?;
//! let results = index.search("Who signed the contract?", 50)?;
//! ```

use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::Embedder;
use crate::store::{MemoryStore, SearchResult, VectorStore};
use crate::{Error, Result};

/// Immutable similarity index combining an embedder and a populated store.
pub struct VectorIndex<E: Embedder, S: VectorStore = MemoryStore> {
    embedder: E,
    store: S,
}

impl<E: Embedder> VectorIndex<E, MemoryStore> {
    /// Build an index backed by a fresh [`MemoryStore`].
    pub fn build(embedder: E, chunks: &[Chunk]) -> Result<Self> {
        Self::build_with(embedder, MemoryStore::new(), chunks)
    }
}

impl<E: Embedder, S: VectorStore> VectorIndex<E, S> {
    /// Embed every chunk once and load the store.
    ///
    /// The build is all-or-nothing: any embedding or store failure returns
    /// [`Error::IndexBuild`] and no index exists.
    pub fn build_with(embedder: E, mut store: S, chunks: &[Chunk]) -> Result<Self> {
        store.clear();

        if !chunks.is_empty() {
            let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
            let embeddings = embedder
                .embed_documents(&texts)
                .map_err(|e| Error::IndexBuild(e.to_string()))?;

            if embeddings.len() != chunks.len() {
                return Err(Error::IndexBuild(format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                )));
            }
            let dimension = embedder.dimension();
            if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
                return Err(Error::IndexBuild(format!(
                    "embedder returned a {}-dimensional vector, expected {dimension}",
                    bad.len()
                )));
            }

            store
                .insert(chunks, &embeddings)
                .map_err(|e| Error::IndexBuild(e.to_string()))?;
        }

        debug!(
            chunks = chunks.len(),
            model = embedder.model_name(),
            "built vector index"
        );
        Ok(Self { embedder, store })
    }

    /// Return at most `k` chunks nearest to the query, best first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.store.is_empty() {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed_query(query)?;
        self.store.search(&query_embedding, k)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}
