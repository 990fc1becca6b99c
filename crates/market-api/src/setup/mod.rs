//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a served router.

pub mod routes;
pub mod server;
pub mod storage;

use crate::services::media_registry::{InMemoryMediaRegistry, MediaRegistry};
use crate::state::AppState;
use anyhow::{Context, Result};
use market_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment());
    crate::error::set_production_mode(config.is_production());

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let registry: Arc<dyn MediaRegistry> = Arc::new(InMemoryMediaRegistry::new());

    build_app(config, storage, registry)
}

/// Wire already-built components into state and router.
pub fn build_app(
    config: Config,
    storage: Arc<market_storage::StorageContext>,
    registry: Arc<dyn MediaRegistry>,
) -> Result<(Arc<AppState>, axum::Router)> {
    let state = Arc::new(AppState::new(config.clone(), storage, registry));
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
