//! Cart engine error types.

use domain::ItemError;
use local_store::StoreError;
use thiserror::Error;

/// Errors that can occur during cart operations.
///
/// Remote sync failures never appear here: they are best-effort and only
/// logged by the sync worker.
#[derive(Debug, Error)]
pub enum CartError {
    /// Add-to-cart input without a resolvable product identifier.
    #[error(transparent)]
    InvalidItem(#[from] ItemError),

    /// The local mirror could not be read or written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The mirror contents could not be serialized.
    #[error("mirror serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
