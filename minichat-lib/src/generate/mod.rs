//! Answer generation
//!
//! The completion endpoint is a collaborator behind [`Generator`]: one prompt
//! in, one completion out. [`OpenAiGenerator`] talks to any server exposing
//! the OpenAI chat completions API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the backend name (e.g. "openai")
    fn name(&self) -> &str;

    /// Complete `prompt`, sent as a single user-role message.
    ///
    /// Failures are reported as [`Error::Generation`](crate::Error::Generation)
    /// carrying the underlying error text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

mod openai;

pub use openai::*;
