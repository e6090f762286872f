use async_trait::async_trait;
use std::fmt;
use crate::types::GenerationConstraints;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// True when the backend honours `GenerationConstraints::response_schema`
    /// and returns bare JSON without further cleanup.
    fn supports_structured_output(&self) -> bool {
        false
    }

    /// Run one generation request and return the raw response text
    async fn generate(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<String>;
}
