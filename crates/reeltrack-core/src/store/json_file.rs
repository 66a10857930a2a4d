use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{tree, Persistence, UpdateBatch};
use crate::error::StoreError;

/// Whole database kept as one JSON document on disk, in the same shape as a
/// realtime-database export.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Value, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Value::Object(Map::new())),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Database file {:?} does not exist, starting empty", self.path);
                Ok(Value::Object(Map::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, root: &Value) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(root)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Persistence for JsonFileStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = tree::split_path(path)?;
        let root = self.load().await?;
        Ok(tree::get(&root, &segments).cloned())
    }

    async fn update(&self, batch: UpdateBatch) -> Result<(), StoreError> {
        let size = batch.len();
        let writes = tree::resolve_batch(batch)?;

        let _guard = self.write_lock.lock().await;
        let mut root = self.load().await?;
        tree::apply(&mut root, writes);
        self.persist(&root).await?;

        info!("Wrote {} paths to {:?}", size, self.path);
        Ok(())
    }
}
