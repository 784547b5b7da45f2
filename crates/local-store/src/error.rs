//! Local store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds text that is not valid store JSON.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for local store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
