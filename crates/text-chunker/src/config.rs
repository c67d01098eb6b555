use serde::{Deserialize, Serialize};

/// Delimiter used when none is configured: a period followed by one space.
pub const DEFAULT_DELIMITER: &str = ". ";

/// Configuration for text chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Literal delimiter the text is split on. It is removed from the output.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl ChunkerConfig {
    /// Config with a custom delimiter
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter.is_empty() {
            return Err("delimiter must not be empty".to_string());
        }

        // Trimming would swallow a whitespace-only delimiter and every piece
        // boundary with it.
        if self.delimiter.trim().is_empty() {
            return Err(format!(
                "delimiter {:?} must contain a non-whitespace character",
                self.delimiter
            ));
        }

        Ok(())
    }
}
