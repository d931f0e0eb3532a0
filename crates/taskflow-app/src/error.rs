//! Error types surfaced by repositories.

use taskflow_core::{CategoryId, TaskId};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by task and category repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Target task does not exist.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// Target category does not exist.
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    /// Task titles must contain non-whitespace characters.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Category names must contain non-whitespace characters.
    #[error("category name must not be empty")]
    EmptyName,

    /// Every identifier up to the maximum is taken.
    #[error("no {0} ids left to allocate")]
    IdSpaceExhausted(&'static str),

    /// Backing store returned an error.
    #[error("store error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Whether the error reports a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_) | Self::CategoryNotFound(_))
    }

    /// Wrap a store-specific error.
    pub(crate) fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

impl From<crate::quick_add::QuickAddError> for StoreError {
    fn from(err: crate::quick_add::QuickAddError) -> Self {
        match err {
            crate::quick_add::QuickAddError::EmptyTitle => Self::EmptyTitle,
        }
    }
}
