//! Text extraction from uploaded files.
//!
//! Plain-text files are decoded as UTF-8; HTML files are reduced to their
//! visible text. Several files are joined with a blank line between them.

use tracing::debug;

use crate::services::content_extractor::{document_text, join_sections, ContentExtractor};
use crate::types::errors::FileImportError;
use crate::types::upload::UploadedFile;

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "md"];
const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

enum FileKind {
    Text,
    Html,
}

/// Extracts the readable text of every file, in order.
pub fn extract_text_from_files(files: &[UploadedFile]) -> Result<String, FileImportError> {
    let mut combined: Option<String> = None;

    for file in files {
        let text = extract_text(file)?;
        if text.trim().is_empty() {
            debug!(file = %file.name, "Skipping file without text");
            continue;
        }
        combined = Some(match combined {
            Some(acc) => join_sections(&acc, &text),
            None => text,
        });
    }

    combined.ok_or(FileImportError::Empty)
}

/// Extracts the readable text of a single file.
pub fn extract_text(file: &UploadedFile) -> Result<String, FileImportError> {
    let kind = classify(file)?;
    let decoded = decode_utf8(&file.data, &file.name)?;
    let text = match kind {
        FileKind::Text => decoded.trim().to_string(),
        FileKind::Html => match ContentExtractor::parse_html(&decoded) {
            Ok(doc) => document_text(&doc),
            Err(_) => String::new(),
        },
    };
    debug!(file = %file.name, chars = text.len(), "Extracted text from file");
    Ok(text)
}

fn classify(file: &UploadedFile) -> Result<FileKind, FileImportError> {
    if let Some(ext) = file.extension() {
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(FileKind::Text);
        }
        if HTML_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(FileKind::Html);
        }
    }

    match file.content_type.as_deref() {
        Some(ct) if ct.starts_with("text/html") || ct.contains("xhtml") => Ok(FileKind::Html),
        Some(ct) if ct.starts_with("text/") => Ok(FileKind::Text),
        _ => Err(FileImportError::Unsupported(file.name.clone())),
    }
}

fn decode_utf8(data: &[u8], name: &str) -> Result<String, FileImportError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    String::from_utf8(data.to_vec()).map_err(|e| FileImportError::Decode(format!("{}: {}", name, e)))
}
