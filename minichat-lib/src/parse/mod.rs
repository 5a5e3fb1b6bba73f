//! Document parsing
//!
//! Turns an uploaded file into text parts ready for chunking. Parts are
//! chunked independently, so a CSV row or a page never shares a chunk with
//! its neighbour.
//!
//! Supported formats:
//! - PDF: text layer via `pdf-extract`, one part per page
//! - CSV: one part per data row, rendered as `header: value` lines
//! - DOCX: paragraphs of `word/document.xml`, one part

use std::fmt;
use std::path::Path;

use crate::chunk::{Chunk, ChunkMetadata, Chunker};
use crate::{Error, Result};

mod docx;
mod pdf;
mod rows;

pub use docx::extract_plaintext_from_docx_xml;

/// File formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Csv,
    Docx,
}

impl DocumentKind {
    /// Detect the format from the file name extension, ignoring case.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            Err(Error::UnsupportedInput(name.to_string()))
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Docx => "docx",
        })
    }
}

/// Text extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Independently chunked pieces, in document order
    pub parts: Vec<String>,
}

impl ParsedDocument {
    /// Total number of characters across parts.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.parts.iter().map(|p| p.chars().count()).sum()
    }

    /// Chunk every part on its own, tagging chunks with `source_id` and the
    /// part index.
    pub fn chunk(&self, source_id: &str, chunker: &dyn Chunker) -> Vec<Chunk> {
        self.parts
            .iter()
            .enumerate()
            .flat_map(|(part, text)| {
                let metadata = ChunkMetadata {
                    source_id: Some(source_id.to_string()),
                    part,
                    ..ChunkMetadata::default()
                };
                chunker.chunk(text, metadata)
            })
            .collect()
    }
}

/// Trait for document parsers
///
/// Errors are returned as [`Error::Parse`] with a message fit to show the user.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, path: &Path, kind: DocumentKind) -> Result<ParsedDocument>;
}

/// Parser for the built-in formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileParser;

impl DocumentParser for FileParser {
    fn parse(&self, path: &Path, kind: DocumentKind) -> Result<ParsedDocument> {
        let parts = match kind {
            DocumentKind::Pdf => pdf::extract_pages(path)?,
            DocumentKind::Csv => rows::extract_rows(path)?,
            DocumentKind::Docx => vec![docx::extract_text(path)?],
        };
        Ok(ParsedDocument { parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::FixedSizeChunker;
    use std::io::Write;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("report.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("Sales.CSV").unwrap(), DocumentKind::Csv);
        assert_eq!(DocumentKind::from_file_name("notes.v2.docx").unwrap(), DocumentKind::Docx);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["report.exe", "notes.doc", "pdf", "archive.pdf.zip", "README"] {
            assert!(
                matches!(DocumentKind::from_file_name(name), Err(Error::UnsupportedInput(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_file_parser_dispatches_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "name,qty\napple,3\npear,5\n").unwrap();

        let doc = FileParser.parse(file.path(), DocumentKind::Csv).unwrap();
        assert_eq!(doc.parts, vec!["name: apple\nqty: 3", "name: pear\nqty: 5"]);
        assert_eq!(doc.char_count(), 35);
    }

    #[test]
    fn test_parts_chunked_separately() {
        let doc = ParsedDocument {
            parts: vec!["abcdefgh".to_string(), String::new(), "ijk".to_string()],
        };
        let chunker = FixedSizeChunker::new(5, 1).unwrap();
        let chunks = doc.chunk("notes.pdf", &chunker);

        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcde", "efgh", "ijk"]);

        let parts: Vec<_> = chunks.iter().map(|c| c.metadata.part).collect();
        assert_eq!(parts, vec![0, 0, 2]);
        assert!(chunks
            .iter()
            .all(|c| c.metadata.source_id.as_deref() == Some("notes.pdf")));
        assert_eq!(chunks[1].metadata.position, 4);
        assert_eq!(chunks[2].metadata.total_chunks, Some(1));
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let path = Path::new("/nonexistent/input.docx");
        for kind in [DocumentKind::Pdf, DocumentKind::Csv, DocumentKind::Docx] {
            assert!(matches!(FileParser.parse(path, kind), Err(Error::Parse(_))));
        }
    }
}
