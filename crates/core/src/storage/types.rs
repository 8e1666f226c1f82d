//! Values exchanged with storage adapters.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use serde::Serialize;

/// Streamed object content.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Metadata for a stored object, mirroring the provider at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// Full object key, including the configured prefix.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time. Listings report the current time for entries
    /// whose provider sends no modification time.
    pub updated: DateTime<Utc>,
    /// Public or signed URL, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A single upload.
pub struct PutInput {
    /// Key relative to the adapter prefix.
    pub key: String,
    /// Object content.
    pub body: ByteStream,
    /// Declared size in bytes.
    pub size: u64,
    /// MIME type stored with the object.
    pub content_type: String,
}

impl PutInput {
    /// Upload of an in-memory buffer; the size is taken from the buffer.
    #[must_use]
    pub fn from_bytes(key: impl Into<String>, data: Bytes, content_type: impl Into<String>) -> Self {
        let size = data.len() as u64;
        Self {
            key: key.into(),
            body: Box::pin(stream::once(async move { Ok(data) })),
            size,
            content_type: content_type.into(),
        }
    }
}

impl std::fmt::Debug for PutInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PutInput")
            .field("key", &self.key)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
