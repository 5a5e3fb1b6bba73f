//! minichat CLI - chat with a PDF, CSV or DOCX file from the terminal
//!
//! # Commands
//!
//! ```bash
//! # Interactive chat; attach files with `/upload PATH`
//! minichat chat --file sales.csv
//!
//! # Load a file and answer one question
//! minichat ask report.pdf "How many sections are there?"
//!
//! # Parse and chunk a file without calling the model
//! minichat chunk notes.docx --strategy recursive --size 1000 --overlap 100
//! ```
//!
//! Credentials come from `MINICHAT_API_KEY` and `MINICHAT_BASE_URL` (a `.env`
//! file in the working directory is honoured) or from `minichat.toml`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use minichat_lib::{
    chat::{Conversation, Message, Reply},
    chunk,
    config::Settings,
    generate::OpenAiGenerator,
    parse::{DocumentKind, DocumentParser, FileParser},
    session::{Session, Stage, Upload},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "bge")]
use minichat_lib::embed::BgeEmbedder as DefaultEmbedder;
#[cfg(not(feature = "bge"))]
use minichat_lib::embed::HashEmbedder as DefaultEmbedder;

#[derive(Parser)]
#[command(name = "minichat")]
#[command(about = "Chat with an uploaded document")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./minichat.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session
    Chat {
        /// File to load before the first question
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Load a file and answer a single question
    Ask {
        /// PDF, CSV or DOCX file
        file: PathBuf,

        /// Question about the file
        question: String,
    },

    /// Parse and chunk a file, then show the chunks
    Chunk {
        /// PDF, CSV or DOCX file
        input: PathBuf,

        /// Chunking strategy: "fixed" or "recursive" (defaults to the configured one)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Chunk size in characters
        #[arg(long)]
        size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },
}

fn upload_for(path: &Path) -> Upload {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Upload::new(name, path)
}

#[cfg(feature = "bge")]
fn embedder(_settings: &Settings) -> Result<DefaultEmbedder> {
    println!("Loading BGE model (first run downloads ~1.2GB)...");
    Ok(DefaultEmbedder::new()?)
}

#[cfg(not(feature = "bge"))]
fn embedder(settings: &Settings) -> Result<DefaultEmbedder> {
    Ok(DefaultEmbedder::new(settings.embedding_dimension)?)
}

fn session(settings: &Settings) -> Result<Session<DefaultEmbedder, OpenAiGenerator>> {
    let generator = OpenAiGenerator::from_settings(settings)?;
    info!(model = generator.model(), "generator ready");
    Ok(Session::from_settings(settings, embedder(settings)?, generator)?)
}

/// Print replies as they arrive, so status updates show while a file loads.
///
/// Ends when every sender is dropped or `out` stops accepting writes.
fn spawn_printer<W>(mut replies: UnboundedReceiver<Reply>, mut out: W) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(reply) = replies.recv().await {
            let written = match reply {
                Reply::Status(text) => writeln!(out, "{text}"),
                Reply::Message(text) => writeln!(out, "\n{text}\n"),
            };
            if written.and_then(|()| out.flush()).is_err() {
                break;
            }
        }
    })
}

async fn chat(settings: &Settings, file: Option<PathBuf>) -> Result<()> {
    let (outbox, replies) = unbounded_channel();
    let printer = spawn_printer(replies, std::io::stdout());
    let conversation = Conversation::new(session(settings)?, outbox);

    conversation.start();

    if let Some(path) = file {
        conversation
            .handle(Message::default().with_file(upload_for(&path)))
            .await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        let message = match line.strip_prefix("/upload ") {
            Some(path) => Message::default().with_file(upload_for(Path::new(path.trim()))),
            None => Message::text(line),
        };
        conversation.handle(message).await;
    }

    // closing the outbox lets the printer drain and stop
    drop(conversation);
    printer.await?;
    Ok(())
}

async fn ask(settings: &Settings, file: &Path, question: &str) -> Result<()> {
    let session = session(settings)?;
    let upload = upload_for(file);

    let report = session
        .ingest(&upload, |stage| match stage {
            Stage::Processing => eprintln!("Processing '{}'...", upload.name),
            Stage::BuildingIndex => eprintln!("Creating vector database..."),
        })
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;
    eprintln!("Loaded {} chunks from '{}'", report.chunk_count, report.file_name);

    let answer = session.answer(question).await?;
    println!("{answer}");
    Ok(())
}

fn show_chunks(
    settings: &Settings,
    input: &Path,
    strategy: Option<String>,
    size: Option<usize>,
    overlap: Option<usize>,
) -> Result<()> {
    let strategy = strategy.unwrap_or_else(|| settings.chunk_strategy.clone());
    let chunker = chunk::by_name(
        &strategy,
        size.unwrap_or(settings.chunk_size),
        overlap.unwrap_or(settings.chunk_overlap),
    )?;

    let upload = upload_for(input);
    let kind = DocumentKind::from_file_name(&upload.name)?;
    let parsed = FileParser.parse(input, kind)?;

    let chunks = parsed.chunk(&upload.name, chunker.as_ref());

    println!(
        "Chunked '{}' ({kind}, {} parts, {} chars) into {} chunks using {strategy} strategy:\n",
        upload.name,
        parsed.parts.len(),
        parsed.char_count(),
        chunks.len()
    );
    for (i, chunk) in chunks.iter().enumerate() {
        let id = chunk.id.get(..8).unwrap_or(&chunk.id);
        println!(
            "--- Chunk {} (part {}, {} chars, id: {id}) ---",
            i + 1,
            chunk.metadata.part,
            chunk.content.chars().count()
        );
        let preview: String = chunk.content.chars().take(200).collect();
        let ellipsis = if chunk.content.chars().count() > 200 { "..." } else { "" };
        println!("{preview}{ellipsis}\n");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat { file } => chat(&settings, file).await?,
        Commands::Ask { file, question } => ask(&settings, &file, &question).await?,
        Commands::Chunk {
            input,
            strategy,
            size,
            overlap,
        } => show_chunks(&settings, &input, strategy, size, overlap)?,
    }

    Ok(())
}
