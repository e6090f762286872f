use rc_core::{Error, Result};
use std::str::FromStr;
use std::sync::Arc;

pub mod deepseek;
pub mod dummy;
pub mod gemini;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use rc_core::InferenceModel;

use crate::Config;

pub const DEFAULT_MODEL: &str = "gemini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Gemini,
    DeepSeek,
    Dummy,
}

impl ModelKind {
    /// Remote backends cannot start without the credential.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ModelKind::Dummy)
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "deepseek" => Ok(Self::DeepSeek),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model: {} (available: gemini, deepseek, dummy)",
                other
            ))),
        }
    }
}

pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    let kind: ModelKind = config.model_name.as_deref().unwrap_or(DEFAULT_MODEL).parse()?;

    let model: Arc<dyn InferenceModel> = match kind {
        ModelKind::Gemini => Arc::new(GeminiModel::new(&config)?),
        ModelKind::DeepSeek => Arc::new(DeepSeekModel::new(&config)?),
        ModelKind::Dummy => Arc::new(DummyModel::new()),
    };
    Ok(model)
}
