//! Test doubles shared by the session and conversation tests.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::embed::{Embedder, Embedding, HashEmbedder};
use crate::generate::Generator;
use crate::{Error, Result};

/// Generator that records prompts and replies from a script.
///
/// Queued failures are returned first; otherwise it echoes a fixed answer.
#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    prompts: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub(crate) const ANSWER: &'static str = "scripted answer";

    pub(crate) fn fail_next(&self, message: &str) {
        self.failures.lock().unwrap().push_back(message.to_string());
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn last_prompt(&self) -> String {
        self.prompts().last().cloned().expect("generator was called")
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(message) = self.failures.lock().unwrap().pop_front() {
            return Err(Error::Generation(message));
        }
        Ok(Self::ANSWER.to_string())
    }
}

/// Hash embedder that can be switched into a failing mode (documents and queries).
#[derive(Default)]
pub(crate) struct SwitchableEmbedder {
    inner: HashEmbedder,
    failing: AtomicBool,
}

impl SwitchableEmbedder {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Embedder for SwitchableEmbedder {
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Embedding("embedding service unavailable".to_string()));
        }
        self.inner.embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> Result<Embedding> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Embedding("embedding service unavailable".to_string()));
        }
        self.inner.embed_query(text)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        "switchable"
    }
}

/// Write `content` to a temp file with the given suffix.
pub(crate) fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
