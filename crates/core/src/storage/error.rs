//! Storage error types.

use std::time::Duration;

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// No public base URL and no signing credentials.
    #[error("signed url requires a service account key (set GCS_CREDENTIALS_FILE)")]
    SigningUnavailable,

    /// Presign operation not supported by provider.
    #[error("presign operation not supported by storage provider")]
    PresignNotSupported,

    /// The provider call did not finish within the request deadline.
    #[error("storage call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The upload body could not be read.
    #[error("failed to read upload body: {0}")]
    Body(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

/// Provider errors carry no key, so every kind maps to `Operation`.
/// Call sites that know the key or the operation build `NotFound` and
/// `PresignNotSupported` themselves.
impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Operation(err.to_string())
    }
}
