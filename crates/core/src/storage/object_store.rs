//! OpenDAL-backed object operations shared by the provider adapters.
//!
//! The adapters differ only in how the operator is built and in when signing is
//! allowed. Everything else (prefixing, single-shot writes, cursor-following
//! listings, existence-checked deletes) lives here so both behave the same.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use opendal::{ErrorKind, Operator};

use super::error::StorageError;
use super::keys::{KeyPrefix, public_url};
use super::types::{FileInfo, PutInput};

/// Operator plus the key namespace and public URL settings of one bucket.
#[derive(Debug, Clone)]
pub(crate) struct ObjectStore {
    operator: Operator,
    prefix: KeyPrefix,
    public_base_url: Option<String>,
}

impl ObjectStore {
    pub(crate) fn new(operator: Operator, prefix: &str, public_base_url: Option<&str>) -> Self {
        Self {
            operator,
            prefix: KeyPrefix::new(prefix),
            public_base_url: public_base_url.map(String::from),
        }
    }

    pub(crate) fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    fn capability(&self) -> opendal::Capability {
        self.operator.info().full_capability()
    }

    /// Public URL for a caller key, if a public base URL is configured.
    pub(crate) fn public_url(&self, key: &str) -> Option<String> {
        public_url(self.public_base_url.as_deref(), &self.prefix.qualify(key))
    }

    /// Writes the whole body with one request.
    pub(crate) async fn put(&self, input: PutInput) -> Result<FileInfo, StorageError> {
        let key = self.prefix.qualify(&input.key);

        let chunks: Vec<Bytes> = input
            .body
            .try_collect()
            .await
            .map_err(|e| StorageError::Body(e.to_string()))?;

        let mut write = self.operator.write_with(&key, chunks);
        if self.capability().write_with_content_type {
            write = write.content_type(&input.content_type);
        }
        write.await?;

        let url = public_url(self.public_base_url.as_deref(), &key);
        Ok(FileInfo {
            key,
            size: input.size,
            updated: Utc::now(),
            url,
        })
    }

    /// Deletes an existing object. A missing object is reported as `NotFound`.
    pub(crate) async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = self.prefix.qualify(key);

        match self.operator.stat(&key).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::not_found(key)),
            Err(e) => return Err(e.into()),
        }

        self.operator.delete(&key).await.map_err(StorageError::from)
    }

    /// Follows the provider cursor until `limit` objects are collected or the
    /// listing ends.
    pub(crate) async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<FileInfo>, StorageError> {
        let prefix = self.prefix.qualify(prefix);
        let mut lister = self
            .operator
            .lister_with(&prefix)
            .recursive(self.capability().list_with_recursive)
            .await?;

        let mut files = Vec::new();
        while files.len() < limit {
            let Some(entry) = lister.try_next().await? else {
                break;
            };

            let meta = entry.metadata();
            if meta.is_dir() {
                continue;
            }

            let key = entry.path().to_string();
            let updated = match meta
                .last_modified()
                .and_then(|ts| ts.to_string().parse::<DateTime<Utc>>().ok())
            {
                Some(ts) => ts,
                None => {
                    tracing::debug!(key = %key, "Listing entry has no modification time");
                    Utc::now()
                }
            };

            files.push(FileInfo {
                url: public_url(self.public_base_url.as_deref(), &key),
                size: meta.content_length(),
                updated,
                key,
            });
        }

        Ok(files)
    }

    /// Presigned GET for a caller key. Does not check that the object exists.
    pub(crate) async fn presign_read(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        let key = self.prefix.qualify(key);
        let presigned = self
            .operator
            .presign_read(&key, expiry)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Unsupported => StorageError::PresignNotSupported,
                _ => StorageError::from(e),
            })?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use opendal::{Operator, services};

    /// In-process operator for adapter tests.
    pub(crate) fn memory_operator() -> Operator {
        Operator::new(services::Memory::default())
            .expect("memory operator")
            .finish()
    }
}
