use std::fmt;
use std::time::Duration;

pub mod analysis;
pub mod models;

pub use analysis::{AnalysisGenerator, AnalysisOutcome};
pub use models::{create_model, ModelKind};

/// Connection settings for the generation backend.
#[derive(Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    /// Backend name: gemini, deepseek or dummy
    pub model_name: Option<String>,
    /// Provider-side model identifier, e.g. gemini-1.5-flash
    pub model_id: Option<String>,
    /// Override for the provider base URL
    pub model_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_id", &self.model_id)
            .field("model_url", &self.model_url)
            .finish()
    }
}

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_PASSAGE_CHARS: usize = 8000;
pub const DEFAULT_QUESTION_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub max_retries: u32,
    /// First backoff wait; doubled after every failed attempt
    pub backoff_base: Duration,
    pub max_passage_chars: usize,
    pub question_count: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
            max_passage_chars: DEFAULT_MAX_PASSAGE_CHARS,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }
}

pub mod prelude {
    pub use super::analysis::{AnalysisGenerator, AnalysisOutcome};
    pub use super::models::create_model;
    pub use super::{AnalysisSettings, Config};
    pub use rc_core::{Analysis, Error, InferenceModel, Question, Result};
}
