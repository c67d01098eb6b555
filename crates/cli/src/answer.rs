//! Retrieval-augmented answers.

use crate::completion::CompletionService;
use anyhow::{Context as AnyhowContext, Result};
use ragchat_engine::{ChatKey, IngestReport, RetrievalEngine, RetrievedChunk};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub const INSUFFICIENT_DATA_ANSWER: &str =
    "There is not enough information in the provided files to answer this.";
pub const EXHAUSTED_ANSWER: &str = "Error: no model was able to answer.";

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub passages: Vec<RetrievedChunk>,
    /// False when the answer was produced without asking a model
    pub model_called: bool,
}

/// Prompt restricting the model to `passages`.
pub fn build_prompt(passages: &[&str], question: &str) -> String {
    format!(
        "Answer ONLY based on the passages below. \
         If the answer is not in the passages, say there is not enough data.\n\n\
         Relevant passages:\n{}\n\nUser question:\n{question}",
        passages.join("\n---\n")
    )
}

/// Run an ingestion on the blocking pool.
pub async fn ingest_blocking(
    engine: &Arc<RetrievalEngine>,
    key: &ChatKey,
    paths: Vec<PathBuf>,
) -> Result<IngestReport> {
    let engine = Arc::clone(engine);
    let key = key.clone();
    let report = tokio::task::spawn_blocking(move || engine.ingest(&key, &paths))
        .await
        .context("ingestion task panicked")??;
    Ok(report)
}

/// Run a retrieval on the blocking pool.
pub async fn retrieve_blocking(
    engine: &Arc<RetrievalEngine>,
    key: &ChatKey,
    question: &str,
    k: usize,
) -> Result<Vec<RetrievedChunk>> {
    let engine = Arc::clone(engine);
    let key = key.clone();
    let question = question.to_string();
    let hits = tokio::task::spawn_blocking(move || engine.retrieve_scored(&key, &question, k))
        .await
        .context("retrieval task panicked")??;
    Ok(hits)
}

/// Answer `question` from the chat's documents. Never fails because of the
/// completion service; exhaustion yields a fixed answer.
pub async fn answer_question(
    engine: &Arc<RetrievalEngine>,
    completion: &dyn CompletionService,
    models: &[String],
    key: &ChatKey,
    question: &str,
    k: usize,
) -> Result<Answer> {
    let passages = retrieve_blocking(engine, key, question, k).await?;
    if passages.is_empty() {
        return Ok(Answer {
            text: INSUFFICIENT_DATA_ANSWER.to_string(),
            passages,
            model_called: false,
        });
    }

    let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
    let prompt = build_prompt(&texts, question);
    let text = match completion.complete(&prompt, models).await {
        Ok(text) => text,
        Err(err) => {
            log::warn!("Completion failed for chat {key}: {err}");
            EXHAUSTED_ANSWER.to_string()
        }
    };

    Ok(Answer {
        text,
        passages,
        model_called: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use ragchat_engine::RetrievalConfig;
    use ragchat_text_chunker::Chunker;
    use ragchat_vector_store::EmbeddingModel;
    use std::sync::Mutex;

    /// Records prompts; fails when `fail` is set.
    struct Recording {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionService for Recording {
        async fn complete(&self, prompt: &str, models: &[String]) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(CompletionError::Exhausted(vec![]));
            }
            Ok(format!("answered by {}", models[0]))
        }
    }

    fn engine() -> Arc<RetrievalEngine> {
        let engine = RetrievalEngine::new(
            Arc::new(EmbeddingModel::stub(384)),
            Chunker::default(),
            RetrievalConfig::default(),
        );
        engine
            .ingest_text(
                &ChatKey::from(7),
                "paris.txt",
                "Paris is the capital of France. The Eiffel Tower is in Paris.",
            )
            .unwrap();
        Arc::new(engine)
    }

    #[test]
    fn prompt_joins_passages_with_separators() {
        let prompt = build_prompt(&["one", "two"], "why?");
        assert!(prompt.starts_with("Answer ONLY based on the passages below."));
        assert!(prompt.contains("Relevant passages:\none\n---\ntwo\n\nUser question:\nwhy?"));
    }

    #[tokio::test]
    async fn empty_retrieval_skips_the_model() {
        let completion = Recording {
            prompts: Mutex::new(vec![]),
            fail: false,
        };
        let models = vec!["m".to_string()];
        let answer = answer_question(&engine(), &completion, &models, &ChatKey::from(8), "hi", 5)
            .await
            .unwrap();
        assert_eq!(answer.text, INSUFFICIENT_DATA_ANSWER);
        assert!(!answer.model_called);
        assert!(completion.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn passages_reach_the_prompt() {
        let completion = Recording {
            prompts: Mutex::new(vec![]),
            fail: false,
        };
        let models = vec!["m".to_string()];
        let answer = answer_question(
            &engine(),
            &completion,
            &models,
            &ChatKey::from(7),
            "capital of France",
            5,
        )
        .await
        .unwrap();
        assert_eq!(answer.text, "answered by m");
        assert_eq!(answer.passages.len(), 1);
        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Paris is the capital of France"));
        assert!(!prompts[0].contains("Eiffel"));
    }

    #[tokio::test]
    async fn exhaustion_yields_fixed_answer() {
        let completion = Recording {
            prompts: Mutex::new(vec![]),
            fail: true,
        };
        let answer = answer_question(
            &engine(),
            &completion,
            &["m".to_string()],
            &ChatKey::from(7),
            "capital of France",
            5,
        )
        .await
        .unwrap();
        assert_eq!(answer.text, EXHAUSTED_ANSWER);
        assert!(answer.model_called);
    }
}
