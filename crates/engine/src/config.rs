use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Squared-L2 cut-off calibrated for normalized MiniLM embeddings.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 1.2;
pub const DEFAULT_TOP_K: usize = 5;

const THRESHOLD_ENV: &str = "RAGCHAT_RELEVANCE_THRESHOLD";
const TOP_K_ENV: &str = "RAGCHAT_TOP_K";

/// Retrieval tuning
///
/// Only neighbours with a squared distance strictly below
/// `relevance_threshold` are returned. The threshold depends on the
/// embedding model; change it together with the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub relevance_threshold: f32,
    pub default_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            default_k: DEFAULT_TOP_K,
        }
    }
}

/// On-disk shape: every key optional, missing keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    relevance_threshold: Option<f32>,
    default_k: Option<usize>,
}

impl RetrievalConfig {
    /// Defaults, then the optional TOML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw).map_err(|err| match err {
                    EngineError::ConfigParse { source, .. } => EngineError::ConfigParse {
                        path: path.display().to_string(),
                        source,
                    },
                    other => other,
                })?
            }
            None => Self::default(),
        };

        let threshold = std::env::var(THRESHOLD_ENV).ok();
        let top_k = std::env::var(TOP_K_ENV).ok();
        config.with_overrides(threshold.as_deref(), top_k.as_deref())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: RawConfig = toml::from_str(raw).map_err(|source| EngineError::ConfigParse {
            path: "<inline>".to_string(),
            source,
        })?;
        let defaults = Self::default();
        let config = Self {
            relevance_threshold: parsed
                .relevance_threshold
                .unwrap_or(defaults.relevance_threshold),
            default_k: parsed.default_k.unwrap_or(defaults.default_k),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply raw override values (as read from the environment). Blank
    /// values are ignored.
    pub fn with_overrides(mut self, threshold: Option<&str>, top_k: Option<&str>) -> Result<Self> {
        if let Some(raw) = threshold.map(str::trim).filter(|v| !v.is_empty()) {
            self.relevance_threshold = raw.parse().map_err(|_| {
                EngineError::Config(format!("{THRESHOLD_ENV}='{raw}' is not a number"))
            })?;
        }
        if let Some(raw) = top_k.map(str::trim).filter(|v| !v.is_empty()) {
            self.default_k = raw.parse().map_err(|_| {
                EngineError::Config(format!("{TOP_K_ENV}='{raw}' is not a positive integer"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.relevance_threshold.is_finite() || self.relevance_threshold <= 0.0 {
            return Err(EngineError::Config(format!(
                "relevance_threshold must be a finite number > 0, got {}",
                self.relevance_threshold
            )));
        }
        if self.default_k == 0 {
            return Err(EngineError::Config("default_k must be > 0".to_string()));
        }
        Ok(())
    }
}
