//! Core storage logic for Filegate.
//!
//! This crate contains the storage abstraction with ZERO web dependencies.
//!
//! # Modules
//!
//! - `filename` - Collision-resistant, path-safe object names
//! - `storage` - The `Storage` contract and its S3 and GCS adapters

pub mod filename;
pub mod storage;

pub use storage::{FileInfo, GcsStorage, PutInput, S3Storage, Storage, StorageError};
