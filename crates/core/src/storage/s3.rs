//! S3-compatible adapter (AWS S3, MinIO, Cloudflare R2, ...).

use std::time::Duration;

use async_trait::async_trait;
use filegate_shared::S3Config;
use opendal::{Operator, services};

use super::error::StorageError;
use super::object_store::ObjectStore;
use super::types::{FileInfo, PutInput};
use super::Storage;

/// Storage adapter for S3-compatible services.
#[derive(Debug, Clone)]
pub struct S3Storage {
    store: ObjectStore,
}

impl S3Storage {
    /// Builds the adapter from configuration.
    ///
    /// Static credentials are used when both keys are configured; otherwise
    /// OpenDAL resolves them from the default chain (environment, shared
    /// profile, instance role).
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket is missing or the operator cannot be built.
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::configuration("S3_BUCKET is required"));
        }

        let mut builder = services::S3::default()
            .bucket(config.bucket.trim())
            .region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some((access_key_id, secret_access_key)) = config.static_credentials() {
            builder = builder
                .access_key_id(access_key_id)
                .secret_access_key(secret_access_key);
        }
        if !config.force_path_style {
            builder = builder.enable_virtual_host_style();
        }

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            path_style = config.force_path_style,
            static_credentials = config.static_credentials().is_some(),
            "S3 storage initialized"
        );

        Ok(Self::from_operator(
            operator,
            &config.prefix,
            config.public_base_url.as_deref(),
        ))
    }

    pub(crate) fn from_operator(
        operator: Operator,
        prefix: &str,
        public_base_url: Option<&str>,
    ) -> Self {
        Self {
            store: ObjectStore::new(operator, prefix, public_base_url),
        }
    }

    /// Normalized key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.store.prefix().as_str()
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, input: PutInput) -> Result<FileInfo, StorageError> {
        self.store.put(input).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.store.delete(key).await
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<FileInfo>, StorageError> {
        self.store.list(prefix, limit).await
    }

    async fn get_url(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        if let Some(url) = self.store.public_url(key) {
            return Ok(url);
        }
        self.store.presign_read(key, expiry).await
    }

    fn provider_name(&self) -> &'static str {
        "s3"
    }
}
