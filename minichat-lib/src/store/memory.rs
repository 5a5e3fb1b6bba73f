use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// In-memory vector store.
///
/// Uses brute-force cosine similarity search. One uploaded document rarely
/// exceeds a few thousand chunks, which this handles comfortably.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<(Chunk, Embedding)>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|(_, e)| e.len())
    }
}

impl VectorStore for MemoryStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let expected = self
            .dimension()
            .or_else(|| embeddings.first().map(Vec::len));
        if let Some(expected) = expected {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(Error::Store(format!(
                    "embedding dimension mismatch: expected {expected}, got {}",
                    bad.len()
                )));
            }
        }

        self.entries.extend(
            chunks
                .iter()
                .cloned()
                .zip(embeddings.iter().cloned()),
        );
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if let Some(dim) = self.dimension() {
            if query.len() != dim {
                return Err(Error::Store(format!(
                    "query dimension mismatch: expected {dim}, got {}",
                    query.len()
                )));
            }
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(query, embedding),
            })
            .collect();

        // stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction, and 0 when
/// either vector is all zeros.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;

    fn row(id: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            content: format!("row {id}"),
            metadata: ChunkMetadata::default(),
        }
    }

    fn store_with(entries: &[(&str, Embedding)]) -> MemoryStore {
        let chunks: Vec<Chunk> = entries.iter().map(|(id, _)| row(id)).collect();
        let embeddings: Vec<Embedding> = entries.iter().map(|(_, e)| e.clone()).collect();
        let mut store = MemoryStore::new();
        store.insert(&chunks, &embeddings).unwrap();
        store
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.id.as_str()).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[3.0, 4.0], &[3.0, 4.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_ranked_by_similarity() {
        let store = store_with(&[
            ("orthogonal", vec![0.0, 1.0, 0.0]),
            ("same", vec![2.0, 0.0, 0.0]),
            ("between", vec![0.5, 0.5, 0.0]),
        ]);
        assert_eq!(store.len(), 3);

        let results = store.search(&vec![1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(ids(&results), vec!["same", "between", "orthogonal"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = store_with(&[
            ("a", vec![0.0, 1.0]),
            ("b", vec![0.0, 3.0]),
            ("c", vec![0.0, 1.0]),
        ]);
        let results = store.search(&vec![0.0, 1.0], 3).unwrap();
        assert_eq!(ids(&results), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_k_bounds_result_count() {
        let store = store_with(&[
            ("1", vec![1.0, 0.0]),
            ("2", vec![0.9, 0.1]),
            ("3", vec![0.8, 0.2]),
        ]);
        let query = vec![1.0, 0.0];

        assert_eq!(ids(&store.search(&query, 2).unwrap()), vec!["1", "2"]);
        assert!(store.search(&query, 0).unwrap().is_empty());
        assert_eq!(store.search(&query, 50).unwrap().len(), 3);
        assert!(MemoryStore::new().search(&query, 5).unwrap().is_empty());
    }

    #[test]
    fn test_rejected_inserts_leave_store_unchanged() {
        let mut store = store_with(&[("1", vec![1.0, 0.0])]);

        let short = store.insert(&[row("2"), row("3")], &[vec![1.0, 0.0]]);
        assert!(matches!(short, Err(Error::Store(_))));

        let ragged = store.insert(&[row("2"), row("3")], &[vec![1.0, 0.0], vec![1.0]]);
        assert!(matches!(ragged, Err(Error::Store(_))));

        let wrong_dim = store.insert(&[row("2")], &[vec![1.0, 0.0, 0.0]]);
        assert!(matches!(wrong_dim, Err(Error::Store(_))));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_repeated_chunks_are_kept() {
        // equal rows get equal ids; dedup happens at context assembly
        let store = store_with(&[("header", vec![1.0]), ("header", vec![1.0])]);
        assert_eq!(ids(&store.search(&vec![1.0], 5).unwrap()), vec!["header", "header"]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let store = store_with(&[("1", vec![1.0, 0.0])]);
        assert!(matches!(store.search(&vec![1.0], 1), Err(Error::Store(_))));
    }

    #[test]
    fn test_clear() {
        let mut store = store_with(&[("1", vec![1.0])]);
        store.clear();
        assert!(store.is_empty());

        // dimension is free again once cleared
        store.insert(&[row("2")], &[vec![1.0, 0.0]]).unwrap();
        assert_eq!(store.len(), 1);
    }
}
