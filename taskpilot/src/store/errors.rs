//! Credential store error types.

use thiserror::Error;

/// Errors raised by a durable storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials could not be encoded
    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by credential store mutators
#[derive(Debug, Error)]
pub enum CredentialError {
    /// An empty access token can never represent a signed-in session
    #[error("Refusing to store an empty access token")]
    EmptyAccessToken,

    /// The in-memory state was updated but could not be persisted
    #[error("Failed to persist credentials: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for storage backends
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for credential store mutations
pub type CredentialResult<T> = Result<T, CredentialError>;
