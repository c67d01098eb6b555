use crate::key::ChatKey;
use ragchat_vector_store::{FlatIndex, Result as VectorResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// One indexed fragment of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// File name the chunk was cut from
    pub source: String,
}

/// Chunks and vectors of one chat.
///
/// `chunks[i]` belongs to the vector at index position `i`; the only
/// mutation is [`ChatContext::append`], which keeps both in step.
#[derive(Debug, Default)]
pub struct ChatContext {
    chunks: Vec<Chunk>,
    index: FlatIndex,
    disposed: bool,
}

impl ChatContext {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub const fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// True once the context was removed from its store by a clear.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Append a batch. The index validates dimensions first; on error
    /// neither chunks nor vectors change.
    pub fn append(&mut self, chunks: Vec<Chunk>, vectors: &[Vec<f32>]) -> VectorResult<usize> {
        debug_assert_eq!(chunks.len(), vectors.len());
        self.index.insert(vectors)?;
        let added = chunks.len();
        self.chunks.extend(chunks);
        Ok(added)
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.chunks = Vec::new();
        self.index = FlatIndex::new();
    }
}

/// Chat key → chat context. Each context has its own lock so writers to
/// different chats only share the brief map lookup.
#[derive(Debug, Default)]
pub struct ChatContextStore {
    contexts: RwLock<HashMap<ChatKey, Arc<RwLock<ChatContext>>>>,
}

impl ChatContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ChatKey) -> Option<Arc<RwLock<ChatContext>>> {
        self.contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn get_or_create(&self, key: &ChatKey) -> Arc<RwLock<ChatContext>> {
        if let Some(context) = self.get(key) {
            return context;
        }
        let mut contexts = self.contexts.write().unwrap_or_else(PoisonError::into_inner);
        contexts.entry(key.clone()).or_default().clone()
    }

    /// Detach and dispose the context for `key`. Returns whether one existed.
    pub fn remove(&self, key: &ChatKey) -> bool {
        let removed = self
            .contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        match removed {
            Some(context) => {
                context
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .dispose();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &ChatKey) -> bool {
        self.contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Keys with a live context, sorted.
    pub fn keys(&self) -> Vec<ChatKey> {
        let mut keys: Vec<ChatKey> = self
            .contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
