//! Filegate API Server
//!
//! Main entry point for the storage gateway.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filegate_api::{AppState, UploadPolicy, create_router};
use filegate_core::storage::{GcsStorage, S3Storage, Storage};
use filegate_shared::{AppConfig, StorageProviderKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filegate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Build the storage adapter
    let storage: Arc<dyn Storage> = match config.storage.provider {
        StorageProviderKind::S3 => Arc::new(S3Storage::new(&config.storage.s3)?),
        StorageProviderKind::Gcs => Arc::new(GcsStorage::new(&config.storage.gcs)?),
    };
    let bucket = match config.storage.provider {
        StorageProviderKind::S3 => &config.storage.s3.bucket,
        StorageProviderKind::Gcs => &config.storage.gcs.bucket,
    };
    info!(
        provider = storage.provider_name(),
        bucket = %bucket,
        max_upload_mb = config.upload.max_upload_mb,
        "Storage backend configured"
    );

    // Create application state
    let state = AppState::new(storage, UploadPolicy::from_config(&config));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
