//! Shared configuration and errors for Filegate.
//!
//! This crate provides the types every other crate reads at startup:
//! - Application configuration loaded from files and the environment
//! - Configuration error types

pub mod config;
pub mod error;

pub use config::{
    AppConfig, GcsConfig, S3Config, ServerConfig, StorageConfig, StorageProviderKind,
    UploadConfig,
};
pub use error::{ConfigError, ConfigResult};
