//! Error types for cache store operations.

use swcache_core::GenerationName;
use thiserror::Error;

/// Error type for cache store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),

    /// The addressed generation does not exist.
    #[error("cache generation {0} does not exist")]
    GenerationMissing(GenerationName),
}

impl StoreError {
    /// Wraps any error as [`StoreError::Internal`].
    pub fn internal(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(error.into())
    }
}

/// Status of deleting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}

impl DeleteStatus {
    /// Whether anything was deleted.
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteStatus::Deleted(_))
    }
}
