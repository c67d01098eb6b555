use crate::config::RetrievalConfig;
use crate::error::{EngineError, Result};
use crate::key::ChatKey;
use crate::report::IngestReport;
use crate::store::{ChatContextStore, Chunk};
use ragchat_extractor::extract_document;
use ragchat_text_chunker::Chunker;
use ragchat_vector_store::{Embedder, VectorStoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError};
use std::time::Instant;

/// A retrieved passage with its provenance and squared distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: String,
    pub distance: f32,
}

/// Ingestion and retrieval over isolated per-chat indexes.
///
/// All operations block; async callers should run them on a blocking pool.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    config: RetrievalConfig,
    store: ChatContextStore,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, chunker: Chunker, config: RetrievalConfig) -> Self {
        log::info!(
            "Retrieval engine ready (model {}, threshold {}, k {})",
            embedder.model_id(),
            config.relevance_threshold,
            config.default_k
        );
        Self {
            embedder,
            chunker,
            config,
            store: ChatContextStore::new(),
        }
    }

    pub const fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Extract, chunk, embed and index `paths` into the chat's context.
    ///
    /// Unsupported files are skipped and failed extractions are reported;
    /// neither stops the batch. Embedding or dimension errors abort the
    /// whole batch with nothing committed.
    pub fn ingest<P: AsRef<Path>>(&self, key: &ChatKey, paths: &[P]) -> Result<IngestReport> {
        let start = Instant::now();
        let mut report = IngestReport::new();
        let mut chunks = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match extract_document(path) {
                Ok(Some(document)) => {
                    let source = document.source_name();
                    chunks.extend(self.chunker.chunk_str(&document.text).into_iter().map(
                        |text| Chunk {
                            text,
                            source: source.clone(),
                        },
                    ));
                }
                Ok(None) => report.add_skipped(path.to_path_buf()),
                Err(err) => {
                    log::warn!("Skipping {}: {err}", path.display());
                    report.add_failure(path.to_path_buf(), err.to_string());
                }
            }
        }

        report.indexed = self.commit(key, chunks)?;
        log::info!(
            "Ingested {} files into chat {key}: {} chunks indexed, {} skipped, {} failed ({} ms)",
            paths.len(),
            report.indexed,
            report.skipped_unsupported.len(),
            report.failures.len(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Chunk and index text that is already in memory. Returns the number
    /// of chunks indexed.
    pub fn ingest_text(&self, key: &ChatKey, source: &str, text: &str) -> Result<usize> {
        let chunks = self
            .chunker
            .chunk_str(text)
            .into_iter()
            .map(|text| Chunk {
                text,
                source: source.to_string(),
            })
            .collect();
        self.commit(key, chunks)
    }

    fn commit(&self, key: &ChatKey, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            ))
            .into());
        }

        // A clear between lookup and lock disposes the context; retry
        // against the fresh one the next lookup creates.
        loop {
            let context = self.store.get_or_create(key);
            let mut context = context.write().unwrap_or_else(PoisonError::into_inner);
            if context.is_disposed() {
                continue;
            }
            return context
                .append(chunks, &vectors)
                .map_err(|err| match err {
                    VectorStoreError::InvalidDimension { expected, actual } => {
                        EngineError::DimensionMismatch {
                            chat: key.clone(),
                            expected,
                            actual,
                        }
                    }
                    other => other.into(),
                });
        }
    }

    /// Texts of the chunks closest to `query`, closest first.
    pub fn retrieve(&self, key: &ChatKey, query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .retrieve_scored(key, query, k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Up to `k` chunks whose squared distance to `query` is strictly below
    /// the relevance threshold, ascending by distance.
    pub fn retrieve_scored(
        &self,
        key: &ChatKey,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let Some(context) = self.store.get(key) else {
            return Ok(vec![]);
        };
        if k == 0
            || context
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .index()
                .is_empty()
        {
            return Ok(vec![]);
        }

        let query_vector = self.embedder.embed(query)?;

        let context = context.read().unwrap_or_else(PoisonError::into_inner);
        if context.is_disposed() {
            return Ok(vec![]);
        }
        let neighbors = match context.index().search(&query_vector, k) {
            Ok(neighbors) => neighbors,
            Err(VectorStoreError::InvalidDimension { expected, actual }) => {
                log::warn!(
                    "Query embedding for chat {key} has dimension {actual}, index has {expected}"
                );
                return Ok(vec![]);
            }
            Err(err) => return Err(err.into()),
        };

        let threshold = self.config.relevance_threshold;
        let hits: Vec<RetrievedChunk> = neighbors
            .into_iter()
            .filter(|n| n.distance < threshold)
            .filter_map(|n| {
                context.chunks().get(n.position).map(|chunk| RetrievedChunk {
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    distance: n.distance,
                })
            })
            .collect();

        log::debug!(
            "Chat {key}: {} of {} chunks within threshold {threshold}",
            hits.len(),
            context.chunks().len()
        );
        Ok(hits)
    }

    /// Drop every chunk and vector of the chat. Clearing an unknown chat is
    /// a no-op.
    pub fn clear(&self, key: &ChatKey) {
        if self.store.remove(key) {
            log::info!("Cleared context for chat {key}");
        }
    }

    pub fn chunk_count(&self, key: &ChatKey) -> usize {
        self.store.get(key).map_or(0, |context| {
            context
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .chunks()
                .len()
        })
    }

    pub fn vector_count(&self, key: &ChatKey) -> usize {
        self.store.get(key).map_or(0, |context| {
            context
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .index()
                .len()
        })
    }

    pub fn contains(&self, key: &ChatKey) -> bool {
        self.store.contains(key)
    }

    pub fn chat_keys(&self) -> Vec<ChatKey> {
        self.store.keys()
    }
}
