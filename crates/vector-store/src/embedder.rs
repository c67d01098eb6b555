use crate::error::{Result, VectorStoreError};

/// Turns text into fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// and must be deterministic for a fixed model. They hold no per-chat state,
/// so a single instance is shared by every chat.
pub trait Embedder: Send + Sync {
    /// Identifier of the underlying model, used in logs.
    fn model_id(&self) -> &str;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text])?;
        ensure_batch_len(1, &vectors)?;
        Ok(vectors.remove(0))
    }
}

pub(crate) fn ensure_batch_len(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() == expected {
        return Ok(());
    }
    Err(VectorStoreError::EmbeddingError(format!(
        "embedder returned {} vectors for {expected} texts",
        vectors.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Embedder for Broken {
        fn model_id(&self) -> &str {
            "broken"
        }

        fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![])
        }
    }

    #[test]
    fn embed_rejects_missing_vector() {
        let err = Broken.embed("anything").unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingError(_)));
        assert!(err.to_string().contains("0 vectors for 1 texts"));
    }
}
