//! Text embedding
//!
//! Two embedders ship with the crate:
//!
//! - [`HashEmbedder`]: deterministic feature hashing, no model download.
//!   Cheap and reproducible, but only lexical overlap counts as similarity.
//! - `BgeEmbedder` (cargo feature `bge`): BAAI/bge-large-en-v1.5 via the
//!   fastembed crate (ONNX runtime), a real semantic model.
//!
//! # Usage
//!
//! ```ignore
//! use minichat_lib::embed::{Embedder, HashEmbedder};
//!
//! let embedder = HashEmbedder::default();
//!
//! // Embed documents (for indexing)
//! let doc_embeddings = embedder.embed_documents(&["Invoice 12...", "Invoice 13..."])?;
//!
//! // Embed query (for searching)
//! let query_embedding = embedder.embed_query("Who paid invoice 12?")?;
//! ```

use std::sync::Arc;

use crate::Result;

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
///
/// Embedding takes `&self` so that a built index can serve many concurrent
/// readers; implementations that need mutable model state lock internally.
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Must return exactly one embedding per input text, in input order.
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Note: Some models (like BGE) use different prompts for queries vs documents.
    /// This method handles that distinction.
    fn embed_query(&self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[cfg(feature = "bge")]
mod bge;
mod hash;

#[cfg(feature = "bge")]
pub use bge::*;
pub use hash::*;
