//! Document chunking strategies
//!
//! Sizes are in characters. The defaults are large (3000 with 500 of overlap)
//! so that a record rarely straddles two chunks.
//!
//! - [`FixedSizeChunker`]: plain sliding window over characters
//! - [`RecursiveChunker`]: sliding window whose ends snap back to paragraph,
//!   line or word breaks when one is close enough
//!
//! # Implementing a Chunker
//!
//! ```ignore
//! use minichat_lib::chunk::{Chunker, Chunk, ChunkMetadata};
//!
//! struct MyChunker { /* ... */ }
//!
//! impl Chunker for MyChunker {
//!     fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk> {
//!         // Your chunking logic here
//!         todo!()
//!     }
//!
//!     fn name(&self) -> &str {
//!         "mine"
//!     }
//! }
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Content hash, identical content yields identical ids
    pub id: String,
    /// The text content of this chunk
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document name (usually the uploaded file name)
    pub source_id: Option<String>,
    /// Parser part the chunk came from (PDF text, CSV row, ...)
    pub part: usize,
    /// Byte offset of the chunk within its part
    pub position: usize,
    /// Total number of chunks cut from this part
    pub total_chunks: Option<usize>,
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split content into chunks
    ///
    /// # Arguments
    /// * `content` - The text content to chunk
    /// * `metadata` - Base metadata to attach to each chunk
    ///
    /// # Returns
    /// Chunks in document order, each with position metadata
    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

/// Build a chunker by strategy name ("fixed" or "recursive").
pub fn by_name(strategy: &str, chunk_size: usize, overlap: usize) -> Result<Box<dyn Chunker>> {
    match strategy {
        "fixed" => Ok(Box::new(FixedSizeChunker::new(chunk_size, overlap)?)),
        "recursive" => Ok(Box::new(RecursiveChunker::new(chunk_size, overlap)?)),
        other => Err(Error::Configuration(format!(
            "unknown chunking strategy '{other}', expected 'fixed' or 'recursive'"
        ))),
    }
}

/// Check the window parameters shared by every sliding window chunker.
pub(crate) fn validate_window(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::Configuration("chunk_size must be positive".to_string()));
    }
    if overlap >= chunk_size {
        return Err(Error::Configuration(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Byte offset of every char start, followed by `content.len()`.
///
/// Index `i` is the byte offset of the `i`th character, so a character range
/// `a..b` maps to the byte range `bounds[a]..bounds[b]`.
pub(crate) fn char_bounds(content: &str) -> Vec<usize> {
    content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect()
}

/// Turn byte spans into chunks carrying a copy of the base metadata.
pub(crate) fn build_chunks(
    content: &str,
    spans: &[(usize, usize)],
    mut metadata: ChunkMetadata,
) -> Vec<Chunk> {
    metadata.total_chunks = Some(spans.len());

    spans
        .iter()
        .map(|&(start, end)| {
            let c = &content[start..end];
            let mut m = metadata.clone();
            m.position = start;
            Chunk {
                id: generate_id(c),
                content: c.to_string(),
                metadata: m,
            }
        })
        .collect()
}

fn generate_id(string: &str) -> String {
    let mut hasher = DefaultHasher::new();
    string.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

mod fixed;
mod recursive;

pub use fixed::*;
pub use recursive::*;
