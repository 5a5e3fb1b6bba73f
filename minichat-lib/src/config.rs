//! Configuration for minichat.
//!
//! Uses `figment` for layered configuration: defaults -> `minichat.toml` ->
//! environment (`MINICHAT_API_KEY`, `MINICHAT_BASE_URL`, `MINICHAT_TOP_K`, ...).
//! The CLI loads a `.env` file into the environment before calling [`Settings::load`].

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::chunk::{validate_window, FixedSizeChunker};
use crate::embed::HashEmbedder;
use crate::route::{KeywordClassifier, DEFAULT_TOP_K};
use crate::{Error, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "minichat.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "MINICHAT_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API key for the completion endpoint (required)
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, e.g. `https://host/v1` (required)
    pub base_url: Option<String>,
    /// Chat model name
    pub model: String,
    /// Chunking strategy: "fixed" or "recursive"
    pub chunk_strategy: String,
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Chunks retrieved for targeted questions
    pub top_k: usize,
    /// Dimension of the feature-hashing embedder
    pub embedding_dimension: usize,
    /// Substrings marking a question as aggregate (case-insensitive)
    pub aggregate_keywords: Vec<String>,
    /// Optional cap on the assembled context, in characters
    pub max_context_chars: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4".to_string(),
            chunk_strategy: "fixed".to_string(),
            chunk_size: FixedSizeChunker::DEFAULT_CHUNK_SIZE,
            chunk_overlap: FixedSizeChunker::DEFAULT_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embedding_dimension: HashEmbedder::DEFAULT_DIMENSION,
            aggregate_keywords: KeywordClassifier::DEFAULT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_context_chars: None,
        }
    }
}

impl Settings {
    /// Load settings from layered sources and check the pipeline parameters.
    ///
    /// Credentials are checked by [`Settings::validate`] when a generator is
    /// built, so commands that never call the model work without them.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (prefixed with `MINICHAT_`)
    /// 2. `config_file`, or `minichat.toml` in the working directory if present
    /// 3. Built-in defaults
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Configuration(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
                }
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let settings = Self::extract(figment)?;
        settings.validate_pipeline()?;
        Ok(settings)
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Check that credentials are present and pipeline parameters are usable.
    pub fn validate(&self) -> Result<()> {
        let missing = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if missing(&self.api_key) || missing(&self.base_url) {
            return Err(Error::Configuration(format!(
                "{ENV_PREFIX}API_KEY and {ENV_PREFIX}BASE_URL must be set (environment, .env or {DEFAULT_CONFIG_FILE})"
            )));
        }
        self.validate_pipeline()
    }

    /// Check only the retrieval parameters, for commands that never call the generator.
    pub fn validate_pipeline(&self) -> Result<()> {
        validate_window(self.chunk_size, self.chunk_overlap)?;
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be positive".to_string()));
        }
        if self.embedding_dimension == 0 {
            return Err(Error::Configuration(
                "embedding_dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
