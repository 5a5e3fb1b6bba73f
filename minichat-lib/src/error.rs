//! Error types for minichat

use thiserror::Error;

/// Result type alias for minichat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in minichat operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials/endpoint or invalid pipeline settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Uploaded file has an extension we cannot parse
    #[error("unsupported file type: {0}")]
    UnsupportedInput(String),

    /// Document parser failed (I/O or format problem)
    #[error("{0}")]
    Parse(String),

    /// Embedding or index construction failed, nothing was replaced
    #[error("failed to build vector index: {0}")]
    IndexBuild(String),

    /// Answer generator call failed
    #[error("{0}")]
    Generation(String),

    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to store or retrieve from vector store
    #[error("store error: {0}")]
    Store(String),
}
