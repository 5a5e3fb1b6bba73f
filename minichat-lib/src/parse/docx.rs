use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use zip::ZipArchive;

use crate::{Error, Result};

const DOCUMENT_XML: &str = "word/document.xml";

/// Read the main document part of a DOCX container and flatten it to text.
pub(super) fn extract_text(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::Parse(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::Parse(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| Error::Parse(format!("{DOCUMENT_XML}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::Parse(e.to_string()))?;

    Ok(extract_plaintext_from_docx_xml(&xml))
}

/// Flatten WordprocessingML to plain text.
///
/// Text runs (`<w:t>`) are concatenated, `<w:tab/>` becomes a tab, breaks and
/// paragraph ends become newlines, and XML entities are decoded.
pub fn extract_plaintext_from_docx_xml(xml: &str) -> String {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    let tokens = TOKENS.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>|</w:p>")
            .expect("docx token pattern is valid")
    });

    let mut text = String::new();
    for caps in tokens.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            text.push_str(&decode_entities(run.as_str()));
            continue;
        }
        let token = caps.get(0).map_or("", |m| m.as_str());
        if token.starts_with("<w:tab") {
            text.push('\t');
        } else {
            text.push('\n');
        }
    }

    text.trim_end().to_string()
}

fn decode_entities(s: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY.get_or_init(|| {
        Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("entity pattern is valid")
    });

    entity
        .replace_all(s, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = match name.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
