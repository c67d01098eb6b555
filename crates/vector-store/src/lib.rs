//! # RAG Chat Vector Store
//!
//! Embeddings and nearest-neighbour search for chat document chunks.
//!
//! ## Features
//!
//! - **Embedder trait** shared by the production model and test doubles
//! - **ONNX Runtime embeddings** with mean pooling and L2 normalization
//! - **Offline stub mode** (`RAGCHAT_EMBEDDING_MODE=stub`) for tests
//! - **Flat L2 index** with exact, append-only search
//!
//! ## Architecture
//!
//! ```text
//! chunk texts
//!     │
//!     ├──> EmbeddingModel (ort + tokenizers, or stub)
//!     │      └─> Vec<f32> (384 for all-minilm-l6-v2)
//!     │
//!     └──> FlatIndex
//!            └─> exact squared-L2 search
//! ```
//!
//! ## Example
//!
//! ```
//! use ragchat_vector_store::{Embedder, EmbeddingModel, FlatIndex};
//!
//! # fn main() -> ragchat_vector_store::Result<()> {
//! let model = EmbeddingModel::stub(64);
//! let mut index = FlatIndex::new();
//! index.insert(&model.embed_batch(&["red apples", "blue sky"])?)?;
//!
//! let hits = index.search(&model.embed("apples")?, 1)?;
//! assert_eq!(hits[0].position, 0);
//! # Ok(())
//! # }
//! ```

mod embedder;
mod embeddings;
mod error;
mod flat_index;

pub use embedder::Embedder;
pub use embeddings::{EmbeddingModel, DEFAULT_MODEL_ID};
pub use error::{Result, VectorStoreError};
pub use flat_index::{squared_l2, FlatIndex, Neighbor};
