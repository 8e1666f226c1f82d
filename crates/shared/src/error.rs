//! Configuration error types.

use thiserror::Error;

/// Result type alias using `ConfigError`.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or merged.
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// `STORAGE_PROVIDER` names a backend we do not support.
    #[error("unknown STORAGE_PROVIDER={0} (use s3 or gcs)")]
    UnknownProvider(String),
}
