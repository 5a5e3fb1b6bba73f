//! Per-conversation session state
//!
//! A [`Session`] holds at most one active document (its chunks and vector
//! index) and exposes the two operations the chat transport needs:
//!
//! - [`Session::ingest`]: parse → chunk → build index, then swap the new
//!   document in. `Empty → Ingesting → Ready`, or back to the previous state
//!   on failure.
//! - [`Session::answer`]: route → assemble → prompt → generator when a
//!   document is active, otherwise the raw question goes to the generator.
//!
//! Queries snapshot the active document under a read lock and release it
//! before calling the generator. Ingestion does all its work outside the lock
//! and only takes the write lock for the swap, so a query sees either the old
//! document or the new one, never a half-built index.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::chunk::{self, Chunk, Chunker, FixedSizeChunker};
use crate::config::Settings;
use crate::context::{build_prompt, AssemblerConfig, ContextAssembler};
use crate::embed::Embedder;
use crate::generate::Generator;
use crate::index::VectorIndex;
use crate::parse::{DocumentKind, DocumentParser, FileParser};
use crate::route::{KeywordClassifier, QueryClassifier, Router, DEFAULT_TOP_K};
use crate::{Error, Result};

/// A file handed over by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Name as uploaded by the user; decides the format
    pub name: String,
    /// Where the transport stored the bytes
    pub path: PathBuf,
}

impl Upload {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Lifecycle of the session's document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No document, questions go straight to the generator
    Empty,
    /// A document is being ingested; queries still see the previous state
    Ingesting,
    /// A document is active and questions are answered from it
    Ready,
}

/// Progress points reported while ingesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parsing and chunking the file
    Processing,
    /// Embedding chunks and building the vector index
    BuildingIndex,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub file_name: String,
    pub chunk_count: usize,
}

/// The active document. Never mutated once built.
struct Document<E: Embedder> {
    name: String,
    chunks: Vec<Chunk>,
    index: VectorIndex<Arc<E>>,
}

/// Resets the ingesting flag however ingestion ends.
struct IngestingFlag<'a>(&'a AtomicBool);

impl<'a> IngestingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for IngestingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One conversation's RAG state.
pub struct Session<E, G, P = FileParser>
where
    E: Embedder + 'static,
    G: Generator,
    P: DocumentParser + 'static,
{
    embedder: Arc<E>,
    generator: G,
    parser: Arc<P>,
    chunker: Arc<dyn Chunker>,
    router: Arc<Router<Box<dyn QueryClassifier>>>,
    assembler: ContextAssembler,
    document: RwLock<Option<Arc<Document<E>>>>,
    ingest_lock: Mutex<()>,
    ingesting: AtomicBool,
}

impl<E, G> Session<E, G, FileParser>
where
    E: Embedder + 'static,
    G: Generator,
{
    /// Session with the default pipeline: fixed 3000/500 chunks, keyword
    /// routing with k = 50, unbounded context, built-in file parsers.
    pub fn new(embedder: E, generator: G) -> Self {
        Self {
            embedder: Arc::new(embedder),
            generator,
            parser: Arc::new(FileParser),
            chunker: Arc::new(FixedSizeChunker::default()),
            router: Arc::new(Router::new(
                Box::new(KeywordClassifier::default()),
                DEFAULT_TOP_K,
            )),
            assembler: ContextAssembler::default(),
            document: RwLock::new(None),
            ingest_lock: Mutex::new(()),
            ingesting: AtomicBool::new(false),
        }
    }

    /// Session configured from [`Settings`] (chunking, routing, context budget).
    pub fn from_settings(settings: &Settings, embedder: E, generator: G) -> Result<Self> {
        settings.validate_pipeline()?;
        let chunker = chunk::by_name(
            &settings.chunk_strategy,
            settings.chunk_size,
            settings.chunk_overlap,
        )?;
        let classifier = KeywordClassifier::new(settings.aggregate_keywords.iter().cloned());

        Ok(Self::new(embedder, generator)
            .with_chunker(chunker)
            .with_router(Router::new(Box::new(classifier), settings.top_k))
            .with_assembler(ContextAssembler::new(AssemblerConfig {
                max_context_chars: settings.max_context_chars,
                ..AssemblerConfig::default()
            })))
    }
}

impl<E, G, P> Session<E, G, P>
where
    E: Embedder + 'static,
    G: Generator,
    P: DocumentParser + 'static,
{
    /// Replace the document parser.
    pub fn with_parser<Q: DocumentParser + 'static>(self, parser: Q) -> Session<E, G, Q> {
        Session {
            embedder: self.embedder,
            generator: self.generator,
            parser: Arc::new(parser),
            chunker: self.chunker,
            router: self.router,
            assembler: self.assembler,
            document: self.document,
            ingest_lock: self.ingest_lock,
            ingesting: self.ingesting,
        }
    }

    #[must_use]
    pub fn with_chunker(mut self, chunker: Box<dyn Chunker>) -> Self {
        self.chunker = Arc::from(chunker);
        self
    }

    #[must_use]
    pub fn with_router(mut self, router: Router<Box<dyn QueryClassifier>>) -> Self {
        self.router = Arc::new(router);
        self
    }

    #[must_use]
    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        if self.ingesting.load(Ordering::SeqCst) {
            SessionState::Ingesting
        } else if self.document.read().await.is_some() {
            SessionState::Ready
        } else {
            SessionState::Empty
        }
    }

    /// Name of the active document, if any.
    pub async fn document_name(&self) -> Option<String> {
        self.document.read().await.as_ref().map(|d| d.name.clone())
    }

    /// Number of chunks in the active document (0 when empty).
    pub async fn chunk_count(&self) -> usize {
        self.document.read().await.as_ref().map_or(0, |d| d.chunks.len())
    }

    /// Ingest an uploaded file, replacing the active document on success.
    ///
    /// `on_stage` is called with [`Stage::Processing`] before parsing and
    /// [`Stage::BuildingIndex`] before embedding. Unsupported file types fail
    /// before any stage is reported. On any error the session keeps the
    /// document it had before.
    pub async fn ingest<F>(&self, upload: &Upload, mut on_stage: F) -> Result<IngestReport>
    where
        F: FnMut(Stage) + Send,
    {
        let kind = DocumentKind::from_file_name(&upload.name)?;

        let _serial = self.ingest_lock.lock().await;
        let _flag = IngestingFlag::raise(&self.ingesting);

        on_stage(Stage::Processing);
        let chunks = self.parse_and_chunk(upload, kind).await.inspect_err(|e| {
            warn!(file = %upload.name, error = %e, "failed to load document");
        })?;

        on_stage(Stage::BuildingIndex);
        let embedder = Arc::clone(&self.embedder);
        let (chunks, index) = tokio::task::spawn_blocking(move || {
            VectorIndex::build(embedder, &chunks).map(|index| (chunks, index))
        })
        .await
        .map_err(|e| Error::IndexBuild(e.to_string()))?
        .inspect_err(|e| {
            warn!(file = %upload.name, error = %e, "failed to build vector index");
        })?;

        let report = IngestReport {
            file_name: upload.name.clone(),
            chunk_count: chunks.len(),
        };
        let document = Document {
            name: upload.name.clone(),
            chunks,
            index,
        };
        *self.document.write().await = Some(Arc::new(document));

        info!(file = %report.file_name, chunks = report.chunk_count, "document ingested");
        Ok(report)
    }

    async fn parse_and_chunk(&self, upload: &Upload, kind: DocumentKind) -> Result<Vec<Chunk>> {
        let parser = Arc::clone(&self.parser);
        let chunker = Arc::clone(&self.chunker);
        let path = upload.path.clone();
        let name = upload.name.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Chunk>> {
            let parsed = parser.parse(&path, kind)?;
            debug!(
                file = %name,
                %kind,
                parts = parsed.parts.len(),
                chars = parsed.char_count(),
                strategy = chunker.name(),
                "parsed document"
            );

            Ok(parsed.chunk(&name, chunker.as_ref()))
        })
        .await
        .map_err(|e| Error::Parse(e.to_string()))?
    }

    /// Answer a question, from the active document when there is one.
    ///
    /// Generator failures come back as [`Error::Generation`]. Retrieval
    /// failures (query embedding, store) keep their own variant and the
    /// generator is not called. Either way the session is unaffected.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let document = self.document.read().await.clone();

        let prompt = match document {
            Some(document) => {
                let router = Arc::clone(&self.router);
                let assembler = self.assembler.clone();
                let question = query.to_string();
                tokio::task::spawn_blocking(move || {
                    prompt_for(&router, &assembler, &document, &question)
                })
                .await
                .map_err(|e| Error::Store(e.to_string()))?
                .inspect_err(|e| warn!(error = %e, "retrieval failed"))?
            }
            None => {
                debug!("no document loaded, plain conversation");
                query.to_string()
            }
        };

        self.generator.complete(&prompt).await.map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::Generation(other.to_string()),
        })
    }
}

/// Route, assemble and wrap the question for a RAG answer.
fn prompt_for<E: Embedder>(
    router: &Router<Box<dyn QueryClassifier>>,
    assembler: &ContextAssembler,
    document: &Document<E>,
    question: &str,
) -> Result<String> {
    let routed = router.route(question, &document.chunks, &document.index)?;
    let context = assembler.assemble(&routed);
    debug!(
        document = %document.name,
        routed = routed.len(),
        context_chars = context.len(),
        "assembled context"
    );
    Ok(build_prompt(&context, question))
}
