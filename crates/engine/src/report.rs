use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that had a supported extension but could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of chunks newly indexed by this batch
    pub indexed: usize,

    /// Files skipped because their extension is not supported
    pub skipped_unsupported: Vec<PathBuf>,

    /// Files that failed extraction
    pub failures: Vec<FileFailure>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_skipped(&mut self, path: PathBuf) {
        self.skipped_unsupported.push(path);
    }

    pub fn add_failure(&mut self, path: PathBuf, error: String) {
        self.failures.push(FileFailure { path, error });
    }
}
