//! Storage setup and initialization

use anyhow::{Context, Result};
use market_core::Config;
use market_storage::{create_storage_context, StorageContext};
use std::sync::Arc;

/// Register every strategy and activate the configured default.
pub async fn setup_storage(config: &Config) -> Result<Arc<StorageContext>> {
    tracing::info!(
        default_strategy = %config.default_strategy(),
        upload_dir = %config.storage().upload_dir.display(),
        "Initializing storage strategies..."
    );

    let context = create_storage_context(config)
        .await
        .context("Failed to initialize storage")?;

    let available = context.available_strategies().await;
    tracing::info!(
        current_strategy = %context.current_strategy_name().await,
        strategies = ?available,
        "Storage initialized successfully"
    );

    Ok(Arc::new(context))
}
