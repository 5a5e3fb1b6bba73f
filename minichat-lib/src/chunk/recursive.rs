use crate::chunk::{build_chunks, char_bounds, validate_window, Chunk, ChunkMetadata, Chunker};
use crate::Result;

/// Break points tried in order, coarsest first.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Separator-aware chunker - sliding window that prefers natural breaks
///
/// Good for: prose and PDF text, where cutting mid-word hurts readability of
/// the retrieved context
///
/// Each window end is pulled back to the last paragraph, line or word break
/// found in the second half of the window. Without one, the window is cut at
/// `chunk_size` like [`FixedSizeChunker`](super::FixedSizeChunker). The next
/// window starts `overlap` characters before the previous end.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    overlap: usize,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate_window(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for RecursiveChunker {
    fn name(&self) -> &str {
        "recursive"
    }

    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk> {
        let bounds = char_bounds(content);
        let chars = bounds.len() - 1;

        let mut spans = Vec::new();
        let mut start = 0;
        while start < chars {
            let mut end = (start + self.chunk_size).min(chars);
            if end < chars {
                end = self.snap_to_separator(content, &bounds, start, end);
            }
            spans.push((bounds[start], bounds[end]));
            if end == chars {
                break;
            }
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        build_chunks(content, &spans, metadata)
    }
}

impl RecursiveChunker {
    /// Char index just past the last separator in `start + chunk_size / 2 .. end`,
    /// or `end` when none is found.
    fn snap_to_separator(&self, content: &str, bounds: &[usize], start: usize, end: usize) -> usize {
        let floor = start + self.chunk_size / 2;
        let window = &content[bounds[floor]..bounds[end]];

        for sep in SEPARATORS {
            let Some(i) = window.rfind(sep) else {
                continue;
            };
            let byte = bounds[floor] + i + sep.len();
            if let Ok(idx) = bounds.binary_search(&byte) {
                if idx > start {
                    return idx;
                }
            }
        }
        end
    }
}
