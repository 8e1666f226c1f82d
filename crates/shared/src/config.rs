//! Application configuration management.
//!
//! Settings come from optional `config/default.toml` and `config/{RUN_MODE}.toml`
//! files, overridden by flat environment variables (`APP_PORT`, `S3_BUCKET`, ...).
//! Every value is read as a string first and converted leniently: a numeric or
//! boolean value that does not parse falls back to its default instead of
//! aborting startup.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// Storage backend configuration.
    pub storage: StorageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

/// Upload limits enforced before any provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Maximum upload size in megabytes.
    pub max_upload_mb: u64,
    /// Allowed extensions, lowercase and without the leading dot.
    pub allowed_extensions: BTreeSet<String>,
}

impl UploadConfig {
    /// Maximum upload size in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Which object store backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProviderKind {
    /// S3-compatible service (AWS S3, MinIO, R2, ...).
    S3,
    /// Google Cloud Storage.
    Gcs,
}

impl StorageProviderKind {
    /// Short provider name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Gcs => "gcs",
        }
    }
}

impl FromStr for StorageProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "gcs" => Ok(Self::Gcs),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for StorageProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage configuration: the selected provider plus both providers' settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected provider.
    pub provider: StorageProviderKind,
    /// S3 settings.
    pub s3: S3Config,
    /// GCS settings.
    pub gcs: GcsConfig,
}

impl StorageConfig {
    /// Default lifetime of generated URLs for the selected provider.
    #[must_use]
    pub fn default_url_expiry(&self) -> Duration {
        let minutes = match self.provider {
            StorageProviderKind::S3 => self.s3.presign_expire_min,
            StorageProviderKind::Gcs => self.gcs.sign_expire_min,
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// S3-compatible connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Region.
    pub region: String,
    /// Bucket name. Required when S3 is selected.
    pub bucket: String,
    /// Key prefix applied to every object.
    pub prefix: String,
    /// Public base URL; when set, URLs are never signed.
    pub public_base_url: Option<String>,
    /// Default presigned URL lifetime in minutes.
    pub presign_expire_min: u64,
    /// Endpoint override for non-AWS backends.
    pub endpoint: Option<String>,
    /// Use path-style addressing instead of virtual-host style.
    pub force_path_style: bool,
    /// Static access key; falls back to the default credential chain when unset.
    pub access_key_id: Option<String>,
    /// Static secret key.
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Explicit credentials, only when both halves are present.
    #[must_use]
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("public_base_url", &self.public_base_url)
            .field("presign_expire_min", &self.presign_expire_min)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Google Cloud Storage connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsConfig {
    /// Bucket name. Required when GCS is selected.
    pub bucket: String,
    /// Key prefix applied to every object.
    pub prefix: String,
    /// Public base URL; when set, URLs are never signed.
    pub public_base_url: Option<String>,
    /// Default signed URL lifetime in minutes.
    pub sign_expire_min: u64,
    /// Service account JSON used for authentication and URL signing.
    pub credentials_file: Option<PathBuf>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_MB: u64 = 20;
const DEFAULT_ALLOWED_EXT: &str = "jpg,jpeg,png,pdf,txt";
const DEFAULT_PROVIDER: &str = "s3";
const DEFAULT_S3_REGION: &str = "ap-southeast-1";
const DEFAULT_PREFIX: &str = "uploads/";
const DEFAULT_EXPIRE_MIN: u64 = 15;

/// Flat view of every recognised setting, exactly as the sources provide it.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    app_host: Option<String>,
    app_port: Option<String>,
    max_upload_mb: Option<String>,
    allowed_ext: Option<String>,
    storage_provider: Option<String>,
    s3_region: Option<String>,
    s3_bucket: Option<String>,
    s3_prefix: Option<String>,
    s3_public_base_url: Option<String>,
    s3_presign_expire_min: Option<String>,
    s3_endpoint: Option<String>,
    s3_force_path_style: Option<String>,
    aws_access_key_id: Option<String>,
    aws_secret_access_key: Option<String>,
    gcs_bucket: Option<String>,
    gcs_prefix: Option<String>,
    gcs_public_base_url: Option<String>,
    gcs_sign_expire_min: Option<String>,
    gcs_credentials_file: Option<String>,
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the provider is unknown.
    pub fn load() -> ConfigResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::default())
            .build()?;

        Self::from_raw(config.try_deserialize()?)
    }

    /// Loads configuration from the process environment only.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be read or the provider is unknown.
    pub fn from_env() -> ConfigResult<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_raw(config.try_deserialize()?)
    }

    fn from_raw(raw: RawSettings) -> ConfigResult<Self> {
        let provider = text_or(raw.storage_provider, DEFAULT_PROVIDER).parse()?;

        let server = ServerConfig {
            host: text_or(raw.app_host, DEFAULT_HOST),
            port: number_or(raw.app_port, DEFAULT_PORT),
        };

        let max_upload_mb = match number_or(raw.max_upload_mb, DEFAULT_MAX_UPLOAD_MB) {
            0 => DEFAULT_MAX_UPLOAD_MB,
            n => n,
        };
        let upload = UploadConfig {
            max_upload_mb,
            allowed_extensions: parse_allowed_extensions(&text_or(
                raw.allowed_ext,
                DEFAULT_ALLOWED_EXT,
            )),
        };

        let s3 = S3Config {
            region: text_or(raw.s3_region, DEFAULT_S3_REGION),
            bucket: text_or(raw.s3_bucket, ""),
            prefix: text_or(raw.s3_prefix, DEFAULT_PREFIX),
            public_base_url: text(raw.s3_public_base_url),
            presign_expire_min: number_or(raw.s3_presign_expire_min, DEFAULT_EXPIRE_MIN),
            endpoint: text(raw.s3_endpoint),
            force_path_style: flag_or(raw.s3_force_path_style, false),
            access_key_id: text(raw.aws_access_key_id),
            secret_access_key: text(raw.aws_secret_access_key),
        };

        let gcs = GcsConfig {
            bucket: text_or(raw.gcs_bucket, ""),
            prefix: text_or(raw.gcs_prefix, DEFAULT_PREFIX),
            public_base_url: text(raw.gcs_public_base_url),
            sign_expire_min: number_or(raw.gcs_sign_expire_min, DEFAULT_EXPIRE_MIN),
            credentials_file: text(raw.gcs_credentials_file).map(PathBuf::from),
        };

        tracing::debug!(provider = %provider, "configuration loaded");

        Ok(Self {
            server,
            upload,
            storage: StorageConfig { provider, s3, gcs },
        })
    }
}

/// Parses a comma separated extension list into a lowercase set without dots.
#[must_use]
pub fn parse_allowed_extensions(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(|part| part.trim().to_lowercase())
        .map(|part| part.trim_start_matches('.').to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// An unset or blank value counts as absent.
fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn text_or(value: Option<String>, default: &str) -> String {
    text(value).unwrap_or_else(|| default.to_string())
}

fn number_or<T: FromStr>(value: Option<String>, default: T) -> T {
    text(value)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag_or(value: Option<String>, default: bool) -> bool {
    match text(value) {
        Some(v) => matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        None => default,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
