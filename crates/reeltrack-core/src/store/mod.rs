//! Persistence layer: a document tree addressed by slash-delimited paths.
//!
//! The engine only needs two operations from it: read a whole subtree, and
//! apply a batch of path writes atomically. Writing `null` deletes a path.

mod json_file;
mod memory;
pub(crate) mod tree;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub(crate) use tree::keyed_children;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::StoreError;

/// Fully-qualified path -> new value. `Value::Null` deletes the path.
pub type UpdateBatch = BTreeMap<String, Value>;

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Read the subtree at `path`, `None` when nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Apply every write in `batch` or none of them.
    async fn update(&self, batch: UpdateBatch) -> Result<(), StoreError>;
}
