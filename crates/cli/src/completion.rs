//! Chat completion with an ordered model fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODELS: &[&str] = &["llama-3.1-8b-instant", "allam-2-7b"];
pub const SYSTEM_PROMPT: &str =
    "Answer strictly using only the information contained in the documents.";

const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One failed model attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub model: String,
    pub error: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API key not found. Set RAGCHAT_API_KEY or GROQ_API_KEY")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No model candidates given")]
    NoCandidates,

    #[error("All models failed: {}", format_attempts(.0))]
    Exhausted(Vec<AttemptFailure>),
}

fn format_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Generates an answer for a fully built prompt, trying `models` in order.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str, models: &[String]) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Endpoint from `RAGCHAT_COMPLETIONS_URL`, key from `RAGCHAT_API_KEY`
    /// or `GROQ_API_KEY`. A missing key is reported per request, not here.
    pub fn from_env() -> Result<Self, CompletionError> {
        let endpoint = non_empty_env("RAGCHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let api_key = non_empty_env("RAGCHAT_API_KEY").or_else(|| non_empty_env("GROQ_API_KEY"));
        Self::new(endpoint, api_key)
    }

    async fn complete_with(&self, model: &str, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_answer(&body)
    }
}

fn parse_answer(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Parse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| CompletionError::Parse("response has no message content".to_string()))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Model candidates from `RAGCHAT_COMPLETION_MODELS` (comma-separated), or
/// the built-in list.
pub fn models_from_env() -> Vec<String> {
    non_empty_env("RAGCHAT_COMPLETION_MODELS")
        .map(|raw| parse_model_list(&raw))
        .filter(|models| !models.is_empty())
        .unwrap_or_else(|| DEFAULT_MODELS.iter().map(ToString::to_string).collect())
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[async_trait]
impl CompletionService for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, models: &[String]) -> Result<String, CompletionError> {
        if models.is_empty() {
            return Err(CompletionError::NoCandidates);
        }

        let mut failures = Vec::with_capacity(models.len());
        for model in models {
            match self.complete_with(model, prompt).await {
                Ok(answer) => {
                    log::debug!("Model {model} answered after {} failures", failures.len());
                    return Ok(answer);
                }
                Err(err) => {
                    log::warn!("Model {model} failed: {err}");
                    failures.push(AttemptFailure {
                        model: model.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        Err(CompletionError::Exhausted(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Paris."}}]}"#;
        assert_eq!(parse_answer(body).unwrap(), "Paris.");
    }

    #[test]
    fn empty_or_null_content_is_an_error() {
        assert!(parse_answer(r#"{"choices":[]}"#).is_err());
        assert!(parse_answer(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
        assert!(parse_answer("not json").is_err());
    }

    #[test]
    fn model_list_parsing() {
        assert_eq!(parse_model_list(" a, ,b ,"), vec!["a", "b"]);
    }

    #[test]
    fn request_shape_matches_chat_completions() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_tokens"], 300);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn missing_key_exhausts_every_model() {
        let client = ChatCompletionsClient::new("http://127.0.0.1:9/v1/chat/completions", None)
            .unwrap();
        let models = vec!["first".to_string(), "second".to_string()];
        match client.complete("prompt", &models).await {
            Err(CompletionError::Exhausted(failures)) => {
                let tried: Vec<&str> = failures.iter().map(|f| f.model.as_str()).collect();
                assert_eq!(tried, vec!["first", "second"]);
                assert!(failures[0].error.contains("API key"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_candidates_is_rejected() {
        let client = ChatCompletionsClient::new(DEFAULT_ENDPOINT, Some("k".into())).unwrap();
        assert!(matches!(
            client.complete("p", &[]).await,
            Err(CompletionError::NoCandidates)
        ));
    }
}
