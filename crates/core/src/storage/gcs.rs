//! Google Cloud Storage adapter.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use filegate_shared::GcsConfig;
use opendal::{Operator, services};
use serde::Deserialize;

use super::error::StorageError;
use super::object_store::ObjectStore;
use super::types::{FileInfo, PutInput};
use super::Storage;

/// The parts of a service account key file needed for URL signing.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    #[serde(default)]
    client_email: String,
    #[serde(default)]
    private_key: String,
}

/// Reads a service account key file and returns its signing identity.
fn read_signing_identity(path: &Path) -> Result<String, StorageError> {
    let raw = std::fs::read(path).map_err(|e| {
        StorageError::configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    let key: ServiceAccountKey = serde_json::from_slice(&raw)
        .map_err(|e| StorageError::configuration(format!("invalid service account json: {e}")))?;

    if key.client_email.is_empty() || key.private_key.is_empty() {
        return Err(StorageError::configuration("invalid service account json"));
    }
    Ok(key.client_email)
}

/// Storage adapter for Google Cloud Storage.
#[derive(Debug, Clone)]
pub struct GcsStorage {
    store: ObjectStore,
    /// Service account email; `None` when URLs cannot be signed.
    signer: Option<String>,
}

impl GcsStorage {
    /// Builds the adapter from configuration.
    ///
    /// With a credential file the adapter authenticates and signs as that
    /// service account. An unreadable or incomplete file only disables signing.
    /// Without one, data calls use Google default credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket is missing or the operator cannot be built.
    pub fn new(config: &GcsConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::configuration("GCS_BUCKET is required"));
        }

        let mut builder = services::Gcs::default().bucket(config.bucket.trim());

        let mut signer = None;
        if let Some(path) = &config.credentials_file {
            let path_str = path
                .to_str()
                .ok_or_else(|| StorageError::configuration("invalid credentials path"))?;
            builder = builder.credential_path(path_str);

            match read_signing_identity(path) {
                Ok(email) => signer = Some(email),
                Err(e) => tracing::warn!(error = %e, "GCS URL signing disabled"),
            }
        }

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        tracing::info!(
            bucket = %config.bucket,
            signer = signer.as_deref().unwrap_or("none"),
            "GCS storage initialized"
        );

        Ok(Self::from_operator(
            operator,
            &config.prefix,
            config.public_base_url.as_deref(),
            signer,
        ))
    }

    pub(crate) fn from_operator(
        operator: Operator,
        prefix: &str,
        public_base_url: Option<&str>,
        signer: Option<String>,
    ) -> Self {
        Self {
            store: ObjectStore::new(operator, prefix, public_base_url),
            signer,
        }
    }

    /// Normalized key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.store.prefix().as_str()
    }

    /// Whether signed URLs can be produced.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl Storage for GcsStorage {
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
        if self.signer.is_none() {
            return Err(StorageError::SigningUnavailable);
        }
        self.store.presign_read(key, expiry).await
    }

    fn provider_name(&self) -> &'static str {
        "gcs"
    }
}
