use async_trait::async_trait;
use rc_core::{Dataset, DatasetStorage, Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const INDENT: &[u8] = b"    ";

/// Stores the dataset as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

pub fn to_pretty_json(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    dataset.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl DatasetStorage for JsonFileStorage {
    async fn load_dataset(&self) -> Result<Option<Dataset>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store_dataset(&self, dataset: &Dataset) -> Result<()> {
        let bytes = to_pretty_json(dataset)?;
        let dir = self.directory();
        std::fs::create_dir_all(&dir)?;

        // Write next to the target and rename so a crash never leaves a half-written file
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to replace {}: {}", self.path.display(), e.error)))?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    async fn previous_source(&self) -> Option<String> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not read {}: {}", self.path.display(), e);
                }
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable previous output {}: {}", self.path.display(), e);
                return None;
            }
        };

        value
            .get("metadata")
            .and_then(|m| m.get("source"))
            .and_then(|s| s.as_str())
            .map(str::to_string)
    }
}
