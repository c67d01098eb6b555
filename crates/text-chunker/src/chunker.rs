use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};

/// Main chunker interface for splitting document text
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker with a validated configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split one document's text into trimmed, non-empty chunks in
    /// document order. Empty or whitespace-only text yields no chunks.
    #[must_use]
    pub fn chunk_str(&self, content: &str) -> Vec<String> {
        content
            .split(self.config.delimiter.as_str())
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chunk_str() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("One. Two. Three.");
        assert_eq!(chunks, vec!["One", "Two", "Three."]);
    }

    #[test]
    fn test_chunk_empty_content() {
        let chunker = Chunker::default();
        assert!(chunker.chunk_str("").is_empty());
        assert!(chunker.chunk_str("   \n\t ").is_empty());
    }

    #[test]
    fn test_trims_and_drops_empty_pieces() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("  Alpha beta.  . \n. Gamma  ");
        assert_eq!(chunks, vec!["Alpha beta", "Gamma"]);
    }

    #[test]
    fn test_period_without_space_does_not_split() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("Version 1.2 is out.Next line");
        assert_eq!(chunks, vec!["Version 1.2 is out.Next line"]);
    }

    #[test]
    fn test_naive_split_on_abbreviations() {
        // Known limitation: "e.g. " is treated as a boundary.
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("Fruit, e.g. apples. Done");
        assert_eq!(chunks, vec!["Fruit, e.g", "apples", "Done"]);
    }

    #[test]
    fn test_newlines_are_kept_inside_chunks() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("page one\npage two. next");
        assert_eq!(chunks, vec!["page one\npage two", "next"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let chunker = Chunker::new(ChunkerConfig::with_delimiter(";")).unwrap();
        assert_eq!(chunker.chunk_str("a; b ;c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = Chunker::new(ChunkerConfig::with_delimiter(" ")).unwrap_err();
        assert!(matches!(err, ChunkerError::InvalidConfig(_)));
    }
}
