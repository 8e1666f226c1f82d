//! Object storage behind one contract, using Apache OpenDAL.
//!
//! Two adapters implement [`Storage`]:
//! - [`S3Storage`]: S3-compatible services (AWS S3, MinIO, Cloudflare R2)
//! - [`GcsStorage`]: Google Cloud Storage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    dyn Storage (HTTP layer)                      │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ S3Storage                      │ GcsStorage                     │
//! │ presign: always available      │ presign: needs service account │
//! ├────────────────────────────────┴────────────────────────────────┤
//! │ ObjectStore: prefix, put, list (cursor until limit), delete     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                      Apache OpenDAL Operator                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys passed to any operation are namespaced under the adapter prefix unless
//! they already start with it, so a key returned in [`FileInfo`] can be used
//! as-is for `get_url` and `delete`.

mod error;
mod gcs;
mod keys;
mod object_store;
mod s3;
mod types;

use std::time::Duration;

use async_trait::async_trait;

pub use error::StorageError;
pub use gcs::GcsStorage;
pub use keys::{KeyPrefix, public_url};
pub use s3::S3Storage;
pub use types::{ByteStream, FileInfo, PutInput};

/// Uniform object storage operations.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes the body under `<prefix><key>` and returns its metadata.
    ///
    /// A key that already starts with the prefix is not prefixed again, so
    /// `x.txt` and `<prefix>x.txt` name the same object and the later write
    /// replaces the earlier one.
    async fn put(&self, input: PutInput) -> Result<FileInfo, StorageError>;

    /// Removes `<prefix><key>`. A missing object is an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Up to `limit` objects under `<prefix><prefix arg>`, in provider order.
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<FileInfo>, StorageError>;

    /// Public URL when configured, otherwise a signed URL valid for `expiry`.
    async fn get_url(&self, key: &str, expiry: Duration) -> Result<String, StorageError>;

    /// Short provider name for logs.
    fn provider_name(&self) -> &'static str;
}
