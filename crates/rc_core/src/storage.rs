use async_trait::async_trait;
use crate::types::Dataset;
use crate::Result;

#[async_trait]
pub trait DatasetStorage: Send + Sync {
    /// Load the last persisted dataset, if there is a readable one
    async fn load_dataset(&self) -> Result<Option<Dataset>>;

    /// Replace the persisted dataset
    async fn store_dataset(&self, dataset: &Dataset) -> Result<()>;

    /// `metadata.source` of the last persisted dataset. Missing, unreadable or
    /// incomplete output is reported as `None`.
    async fn previous_source(&self) -> Option<String>;
}
