use rc_core::{DatasetStorage, Error, Result};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_OUTPUT_PATH: &str = "data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Pretty-printed JSON document on disk
    Json,
    /// Process-local, nothing survives the run
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" | "file" => Ok(Self::Json),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected json or memory)",
                other
            ))),
        }
    }
}

pub fn create_storage(kind: &str, path: Option<&Path>) -> Result<Arc<dyn DatasetStorage>> {
    let storage: Arc<dyn DatasetStorage> = match kind.parse::<StorageKind>()? {
        StorageKind::Json => Arc::new(JsonFileStorage::new(
            path.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_PATH)),
        )),
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
    };
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageKind};
}
