use thiserror::Error;

/// Failures surfaced by [`KnowledgeStore`](super::KnowledgeStore) operations.
///
/// There is no not-found variant: deleting or updating an unknown id is not an error.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Malformed input, rejected before the embedder or index is called.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The embedder or the index failed. Transient and permanent failures are not distinguished.
    #[error("knowledge operation failed: {0:#}")]
    Operational(#[from] anyhow::Error),
}

impl KnowledgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, KnowledgeError>;
