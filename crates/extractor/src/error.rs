use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failure to read a file whose format is supported
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("PDF extraction failed for {}: {reason}", .path.display())]
    Pdf { path: PathBuf, reason: String },

    #[error("DOCX extraction failed for {}: {reason}", .path.display())]
    Docx { path: PathBuf, reason: String },
}

impl ExtractError {
    /// Path of the file that could not be extracted
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::Pdf { path, .. }
            | Self::Docx { path, .. } => path,
        }
    }
}
