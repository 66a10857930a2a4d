use thiserror::Error;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("path '{ancestor}' overlaps '{descendant}' in the same update")]
    OverlappingPaths { ancestor: String, descendant: String },

    #[error("database file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("item '{item_id}' not found for user '{user_id}'")]
    NotFound { user_id: String, item_id: String },

    #[error("item '{item_id}' already exists for user '{user_id}'")]
    AlreadyExists { user_id: String, item_id: String },

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("failed to decode stored data: {0}")]
    Decode(#[from] serde_json::Error),
}
