use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

use super::{tree, Persistence, UpdateBatch};
use crate::error::StoreError;

/// In-process store. Batches are applied to a copy of the tree which is only
/// swapped in once every write succeeded.
pub struct MemoryStore {
    tree: RwLock<Value>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    pub fn from_value(root: Value) -> Self {
        Self {
            tree: RwLock::new(root),
            writes: AtomicUsize::new(0),
        }
    }

    pub async fn snapshot(&self) -> Value {
        self.tree.read().await.clone()
    }

    /// Number of batches applied so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = tree::split_path(path)?;
        let root = self.tree.read().await;
        Ok(tree::get(&root, &segments).cloned())
    }

    async fn update(&self, batch: UpdateBatch) -> Result<(), StoreError> {
        let size = batch.len();
        let writes = tree::resolve_batch(batch)?;

        let mut root = self.tree.write().await;
        let mut staged = root.clone();
        tree::apply(&mut staged, writes);
        *root = staged;

        self.writes.fetch_add(1, Ordering::SeqCst);
        trace!("Applied batch of {} writes", size);
        Ok(())
    }
}
