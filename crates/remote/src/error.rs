//! Remote client error types.

use thiserror::Error;

/// Errors that can occur when calling the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or the response not read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credentials were rejected by the auth endpoints.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
