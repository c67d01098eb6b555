//! # Ragchat Text Chunker
//!
//! Splits extracted document text into retrieval units.
//!
//! ## Algorithm
//!
//! ```text
//! Extracted text
//!     │
//!     ├──> Split on the literal delimiter (". " by default)
//!     │
//!     ├──> Trim surrounding whitespace of every piece
//!     │
//!     └──> Drop pieces that are empty after trimming
//! ```
//!
//! The split is a deliberately simple heuristic, not sentence boundary
//! detection: abbreviations ("e.g. "), decimals followed by a space and
//! non-Latin punctuation are split (or not split) naively.
//!
//! ## Example
//!
//! ```rust
//! use ragchat_text_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! let chunks = chunker.chunk_str("Paris is the capital of France. The Eiffel Tower is in Paris.");
//! assert_eq!(chunks, vec!["Paris is the capital of France", "The Eiffel Tower is in Paris."]);
//! ```

mod chunker;
mod config;
mod error;

pub use chunker::Chunker;
pub use config::{ChunkerConfig, DEFAULT_DELIMITER};
pub use error::{ChunkerError, Result};
