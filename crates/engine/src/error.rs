use crate::key::ChatKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] ragchat_vector_store::VectorStoreError),

    #[error("Embedding dimension mismatch for chat {chat}: index has {expected}, got {actual}")]
    DimensionMismatch {
        chat: ChatKey,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid retrieval config: {0}")]
    Config(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
