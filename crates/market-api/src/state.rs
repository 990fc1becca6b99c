//! Application state shared by all handlers.

use crate::services::media_registry::MediaRegistry;
use market_core::Config;
use market_storage::StorageContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<StorageContext>,
    pub registry: Arc<dyn MediaRegistry>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<StorageContext>,
        registry: Arc<dyn MediaRegistry>,
    ) -> Self {
        Self {
            config,
            storage,
            registry,
        }
    }
}
