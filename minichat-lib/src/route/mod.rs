//! Retrieval routing
//!
//! Decides per query whether to hand the generator the whole document or
//! only the top-k similar chunks. Similarity search is unreliable for
//! "how many X are there" questions, since no single chunk is closest to
//! "all of them", so those queries get every chunk in document order.
//!
//! Classification is a strategy ([`QueryClassifier`]); the router's control
//! flow does not change when the heuristic does.

use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::Embedder;
use crate::index::VectorIndex;
use crate::store::VectorStore;
use crate::Result;

/// Default retrieval breadth, intentionally large to favour recall.
pub const DEFAULT_TOP_K: usize = 50;

/// How a query should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Needs the entire document (counting, totals, enumeration)
    Aggregate,
    /// Answerable from a few relevant excerpts
    Targeted,
}

/// Strategy for classifying queries.
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> QueryKind;
}

impl<C: QueryClassifier + ?Sized> QueryClassifier for Box<C> {
    fn classify(&self, query: &str) -> QueryKind {
        (**self).classify(query)
    }
}

/// Case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub const DEFAULT_KEYWORDS: [&'static str; 4] = ["how many", "count", "number of", "total"];

    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYWORDS)
    }
}

impl QueryClassifier for KeywordClassifier {
    fn classify(&self, query: &str) -> QueryKind {
        let query = query.to_lowercase();
        if self.keywords.iter().any(|k| query.contains(k.as_str())) {
            QueryKind::Aggregate
        } else {
            QueryKind::Targeted
        }
    }
}

/// Picks the chunks a query is answered from.
pub struct Router<C: QueryClassifier = KeywordClassifier> {
    classifier: C,
    top_k: usize,
}

impl Default for Router<KeywordClassifier> {
    fn default() -> Self {
        Self::new(KeywordClassifier::default(), DEFAULT_TOP_K)
    }
}

impl<C: QueryClassifier> Router<C> {
    #[must_use]
    pub fn new(classifier: C, top_k: usize) -> Self {
        Self { classifier, top_k }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Select chunks for `query`.
    ///
    /// Aggregate queries return all of `chunks` in order without touching the
    /// index; targeted queries return up to `top_k` chunks, best first.
    pub fn route<E, S>(
        &self,
        query: &str,
        chunks: &[Chunk],
        index: &VectorIndex<E, S>,
    ) -> Result<Vec<Chunk>>
    where
        E: Embedder,
        S: VectorStore,
    {
        match self.classifier.classify(query) {
            QueryKind::Aggregate => {
                debug!(chunks = chunks.len(), "aggregate query, using full document");
                Ok(chunks.to_vec())
            }
            QueryKind::Targeted => {
                let results = index.search(query, self.top_k)?;
                debug!(
                    k = self.top_k,
                    hits = results.len(),
                    "targeted query, using similarity search"
                );
                Ok(results.into_iter().map(|r| r.chunk).collect())
            }
        }
    }
}
