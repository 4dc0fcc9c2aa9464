//! Error types for document model operations

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("Node {0} is not attached to a parent")]
    Detached(Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Tree structure error: {0}")]
    TreeStructureError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
