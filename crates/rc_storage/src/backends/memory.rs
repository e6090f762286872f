use async_trait::async_trait;
use rc_core::{Dataset, DatasetStorage, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    dataset: Arc<RwLock<Option<Dataset>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(Some(dataset))),
        }
    }
}

#[async_trait]
impl DatasetStorage for MemoryStorage {
    async fn load_dataset(&self) -> Result<Option<Dataset>> {
        Ok(self.dataset.read().await.clone())
    }

    async fn store_dataset(&self, dataset: &Dataset) -> Result<()> {
        *self.dataset.write().await = Some(dataset.clone());
        Ok(())
    }

    async fn previous_source(&self) -> Option<String> {
        self.dataset
            .read()
            .await
            .as_ref()
            .map(|d| d.metadata.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rc_core::Metadata;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.previous_source().await.is_none());

        let dataset = Dataset {
            metadata: Metadata {
                title: "Test Essay".to_string(),
                source: "https://aeon.co/essays/test".to_string(),
                date_scraped: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            },
            passages: vec![],
        };
        storage.store_dataset(&dataset).await.unwrap();

        let clone = storage.clone();
        assert_eq!(clone.previous_source().await.as_deref(), Some("https://aeon.co/essays/test"));
        assert_eq!(clone.load_dataset().await.unwrap(), Some(dataset));
    }
}
