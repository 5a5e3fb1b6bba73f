use crate::chunk::{build_chunks, char_bounds, validate_window, Chunk, ChunkMetadata, Chunker};
use crate::Result;

/// Fixed-size chunker - sliding window over characters
///
/// Consecutive chunks share exactly `overlap` characters; the last chunk ends
/// at the end of the text and may be shorter than `chunk_size`.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    pub const DEFAULT_CHUNK_SIZE: usize = 3000;
    pub const DEFAULT_OVERLAP: usize = 500;

    /// Create a chunker, rejecting `chunk_size == 0` or `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate_window(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk> {
        let bounds = char_bounds(content);
        let chars = bounds.len() - 1;
        let stride = self.chunk_size - self.overlap;

        let mut spans = Vec::with_capacity(chars.div_ceil(stride));
        let mut start = 0;
        while start < chars {
            let end = (start + self.chunk_size).min(chars);
            spans.push((bounds[start], bounds[end]));
            if end == chars {
                break;
            }
            start += stride;
        }

        build_chunks(content, &spans, metadata)
    }
}
