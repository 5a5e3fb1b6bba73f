//! Context assembly
//!
//! Turns routed chunks into the context block of the prompt:
//! 1. Trim each chunk and drop exact duplicates (first occurrence wins)
//! 2. Optionally stop once a character budget is reached
//! 3. Join the survivors with a blank line
//!
//! Documents repeat headers and boilerplate across chunks, and overlapping
//! windows of short parts often collapse to the same text, so deduplication
//! saves a good share of the prompt.

use std::collections::HashSet;

use crate::chunk::Chunk;

mod prompt;

pub use prompt::*;

/// Separator placed between chunk contents.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Configuration for context assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Text placed between chunk contents
    pub separator: String,
    /// Maximum context length in characters, `None` for unbounded
    pub max_context_chars: Option<usize>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_context_chars: None,
        }
    }
}

/// Deduplicating, order-preserving context builder.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: AssemblerConfig,
}

impl ContextAssembler {
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Unique trimmed chunk contents in first-seen order.
    ///
    /// Chunks that are empty after trimming are skipped.
    pub fn unique_contents<'a>(&self, chunks: &'a [Chunk]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        chunks
            .iter()
            .map(|c| c.content.trim())
            .filter(|c| !c.is_empty() && seen.insert(*c))
            .collect()
    }

    /// Build the context string for `chunks`.
    ///
    /// Returns an empty string for an empty chunk sequence. With a budget set,
    /// whole chunks are added while the total stays within it; the first chunk
    /// is always included.
    pub fn assemble(&self, chunks: &[Chunk]) -> String {
        let separator = self.config.separator.as_str();
        let separator_len = separator.chars().count();

        let mut context = String::new();
        let mut used = 0;
        for (i, content) in self.unique_contents(chunks).into_iter().enumerate() {
            let cost = content.chars().count() + if i == 0 { 0 } else { separator_len };
            if let Some(budget) = self.config.max_context_chars {
                if i > 0 && used + cost > budget {
                    break;
                }
            }
            if i > 0 {
                context.push_str(separator);
            }
            context.push_str(content);
            used += cost;
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;

    fn chunks(contents: &[&str]) -> Vec<Chunk> {
        contents
            .iter()
            .map(|c| Chunk {
                id: c.to_string(),
                content: c.to_string(),
                metadata: ChunkMetadata::default(),
            })
            .collect()
    }

    #[test]
    fn test_joins_with_separator() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&chunks(&["alpha", "beta", "gamma"]));
        assert_eq!(context, "alpha\n\nbeta\n\ngamma");
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let assembler = ContextAssembler::default();
        let input = chunks(&["HEADER", "row 1", "HEADER", "row 2", "row 1"]);

        assert_eq!(assembler.assemble(&input), "HEADER\n\nrow 1\n\nrow 2");
        assert_eq!(assembler.unique_contents(&input).len(), 3);
    }

    #[test]
    fn test_dedup_ignores_surrounding_whitespace() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&chunks(&["  page 1\n", "page 1", "\n", "page 2 "]));
        assert_eq!(context, "page 1\n\npage 2");
    }

    #[test]
    fn test_idempotent_over_dedup() {
        let assembler = ContextAssembler::default();
        let input = chunks(&["a", "b", "a", "c", "b", "a"]);
        let deduped: Vec<&str> = assembler.unique_contents(&input);

        assert_eq!(assembler.assemble(&input), assembler.assemble(&chunks(&deduped)));
    }

    #[test]
    fn test_no_duplicate_segments() {
        let assembler = ContextAssembler::default();
        let input = chunks(&["x", "y", "x", "z", "y"]);
        let context = assembler.assemble(&input);

        let segments: Vec<&str> = context.split(DEFAULT_SEPARATOR).collect();
        let distinct: HashSet<&str> = segments.iter().copied().collect();
        assert_eq!(segments.len(), distinct.len());
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let assembler = ContextAssembler::default();
        assert_eq!(assembler.assemble(&[]), "");
    }

    #[test]
    fn test_budget() {
        let assembler = ContextAssembler::new(AssemblerConfig {
            separator: " | ".to_string(),
            max_context_chars: Some(12),
        });
        // "aaaa" (4) + " | bbbb" (7) = 11, adding " | cccc" would be 18
        let context = assembler.assemble(&chunks(&["aaaa", "bbbb", "cccc"]));
        assert_eq!(context, "aaaa | bbbb");
    }

    #[test]
    fn test_budget_keeps_first_chunk() {
        let assembler = ContextAssembler::new(AssemblerConfig {
            max_context_chars: Some(2),
            ..AssemblerConfig::default()
        });
        assert_eq!(assembler.assemble(&chunks(&["oversized", "next"])), "oversized");
    }
}
