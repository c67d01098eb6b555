//! # RAG Chat Engine
//!
//! Per-chat retrieval over uploaded documents.
//!
//! ## Pipeline
//!
//! ```text
//! Uploaded files
//!     │
//!     ├──> Extractor (PDF / TXT / DOCX)
//!     │      └─> Plain text
//!     │
//!     ├──> Chunker (". " split)
//!     │      └─> Chunks
//!     │
//!     └──> Embedder + FlatIndex (one per chat)
//!            └─> Retrieval under a distance threshold
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ragchat_engine::{ChatKey, RetrievalConfig, RetrievalEngine};
//! use ragchat_text_chunker::Chunker;
//! use ragchat_vector_store::EmbeddingModel;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RetrievalEngine::new(
//!         Arc::new(EmbeddingModel::new()?),
//!         Chunker::default(),
//!         RetrievalConfig::default(),
//!     );
//!     let chat = ChatKey::from(7);
//!
//!     let report = engine.ingest(&chat, &["notes.pdf", "faq.txt"])?;
//!     println!("Indexed {} chunks", report.indexed);
//!
//!     for passage in engine.retrieve(&chat, "capital of France", 5)? {
//!         println!("{passage}");
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod error;
mod key;
mod report;
mod store;

pub use config::{RetrievalConfig, DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_TOP_K};
pub use engine::{RetrievalEngine, RetrievedChunk};
pub use error::{EngineError, Result};
pub use key::ChatKey;
pub use report::{FileFailure, IngestReport};
pub use store::{ChatContext, ChatContextStore, Chunk};
