//! minichat - chat with an uploaded document
//!
//! # Architecture
//!
//! ```text
//! Upload -> Parser -> Chunker -> Embedder -> VectorIndex
//!                                                |
//! Question -> Router --(aggregate: all chunks)---+--(targeted: top k)
//!                |
//!            Assembler -> Prompt -> Generator -> Answer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use minichat_lib::{embed::HashEmbedder, generate::OpenAiGenerator, session::{Session, Upload}};
//!
//! let generator = OpenAiGenerator::new("https://llm.example.com/v1", "key", "gpt-4");
//! let session = Session::new(HashEmbedder::default(), generator);
//!
//! session.ingest(&Upload::new("sales.csv", "/tmp/upload-1"), |_| {}).await?;
//! let answer = session.answer("How many orders are there?").await?;
//! ```

pub mod chat;
pub mod chunk;
pub mod config;
pub mod context;
pub mod embed;
pub mod error;
pub mod generate;
pub mod index;
pub mod parse;
pub mod route;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
