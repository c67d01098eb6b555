//! # Ragchat Extractor
//!
//! Turns an uploaded document into one string of raw text.
//!
//! | extension | extraction |
//! |-----------|------------|
//! | `.pdf`    | text of every page, page order, joined by `\n` |
//! | `.txt`    | whole file, strict UTF-8 |
//! | `.docx`   | paragraph texts, document order, joined by `\n` |
//!
//! Extension matching is case-sensitive. Any other file is not an error:
//! [`extract_text`] returns `Ok(None)` so mixed uploads can be processed
//! without special casing.

mod docx;
mod error;
mod format;
mod pdf;

pub use error::{ExtractError, Result};
pub use format::DocumentFormat;

use std::path::{Path, PathBuf};

/// Text extracted from one source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub text: String,
}

impl ExtractedDocument {
    /// File name used as provenance for chunks cut from this document
    #[must_use]
    pub fn source_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

/// Extract the full text of `path`, or `Ok(None)` when the extension is not
/// one of the supported formats.
pub fn extract_text(path: impl AsRef<Path>) -> Result<Option<String>> {
    Ok(extract_document(path)?.map(|doc| doc.text))
}

/// Like [`extract_text`] but keeps the detected format and the path.
pub fn extract_document(path: impl AsRef<Path>) -> Result<Option<ExtractedDocument>> {
    let path = path.as_ref();
    let Some(format) = DocumentFormat::from_path(path) else {
        log::debug!("Skipping unsupported file {}", path.display());
        return Ok(None);
    };

    let text = match format {
        DocumentFormat::Pdf => pdf::extract(path)?,
        DocumentFormat::Txt => read_utf8(path)?,
        DocumentFormat::Docx => docx::extract(path)?,
    };

    log::debug!(
        "Extracted {} chars from {} ({})",
        text.len(),
        path.display(),
        format
    );

    Ok(Some(ExtractedDocument {
        path: path.to_path_buf(),
        format,
        text,
    }))
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ExtractError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize_newlines(text))
}

/// Universal newlines: `\r\n` and a lone `\r` both become `\n`.
fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
