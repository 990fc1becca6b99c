//! Runtime-switchable storage context
//!
//! Holds every registered strategy by name and a single "current" strategy that
//! all storage operations are dispatched to. The registry is fixed at
//! construction; only the current reference changes.

use crate::disk::DiskUsage;
use crate::media_types::content_type_for_key;
use crate::traits::{
    ByteStream, MediaUpload, StorageError, StorageResult, StorageStrategy, StoredMedia,
};
use bytes::Bytes;
use market_core::UploadTarget;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Name reported when no strategy is active
pub const NO_STRATEGY: &str = "none";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDescriptor {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskUsage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub current_strategy: String,
    pub strategies: BTreeMap<String, StrategyDescriptor>,
}

pub struct StorageContext {
    strategies: HashMap<String, Arc<dyn StorageStrategy>>,
    current: RwLock<Option<Arc<dyn StorageStrategy>>>,
    switch_lock: Mutex<()>,
}

impl StorageContext {
    /// Build a context from strategies keyed by their `name()`. No strategy is
    /// current until `set_strategy` succeeds.
    pub fn new(strategies: Vec<Arc<dyn StorageStrategy>>) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();

        Self {
            strategies,
            current: RwLock::new(None),
            switch_lock: Mutex::new(()),
        }
    }

    fn lookup(&self, name: &str) -> StorageResult<&Arc<dyn StorageStrategy>> {
        self.strategies
            .get(name)
            .ok_or_else(|| StorageError::UnknownStrategy(name.to_string()))
    }

    /// Handle to the active strategy.
    ///
    /// Holding the handle pins one strategy for a multi-step operation even if
    /// another request switches strategies meanwhile.
    pub async fn current_strategy(&self) -> StorageResult<Arc<dyn StorageStrategy>> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(StorageError::NoActiveStrategy)
    }

    /// Make `name` the active strategy after checking its availability.
    ///
    /// Switches are serialized; on failure the previous strategy stays active.
    pub async fn set_strategy(&self, name: &str) -> StorageResult<()> {
        let name = name.trim();
        let strategy = self.lookup(name)?.clone();

        let _guard = self.switch_lock.lock().await;

        if !strategy.is_available().await {
            tracing::warn!(strategy = %name, "Rejected switch to unavailable storage strategy");
            return Err(StorageError::Unavailable(name.to_string()));
        }

        let previous = self
            .current
            .write()
            .await
            .replace(strategy)
            .map(|s| s.name());

        tracing::info!(
            strategy = %name,
            previous = previous.unwrap_or(NO_STRATEGY),
            "Storage strategy switched"
        );

        Ok(())
    }

    pub async fn current_strategy_name(&self) -> String {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| NO_STRATEGY.to_string())
    }

    /// Registered strategy names with their live availability
    pub async fn available_strategies(&self) -> BTreeMap<String, bool> {
        let mut result = BTreeMap::new();
        for (name, strategy) in &self.strategies {
            result.insert(name.clone(), strategy.is_available().await);
        }
        result
    }

    pub async fn health_status(&self) -> HealthStatus {
        let mut strategies = BTreeMap::new();
        for (name, strategy) in &self.strategies {
            let descriptor = StrategyDescriptor {
                name: name.clone(),
                available: strategy.is_available().await,
                disk: strategy.disk_usage().await,
            };
            strategies.insert(name.clone(), descriptor);
        }

        HealthStatus {
            current_strategy: self.current_strategy_name().await,
            strategies,
        }
    }

    pub async fn store(&self, upload: MediaUpload, target: UploadTarget) -> StorageResult<StoredMedia> {
        let strategy = self.current_strategy().await?;
        tracing::debug!(
            strategy = strategy.name(),
            target = target.label(),
            filename = %upload.filename,
            size_bytes = upload.size(),
            "Dispatching store"
        );
        strategy.store(upload, target).await
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.current_strategy().await {
            Ok(strategy) => strategy.exists(key).await,
            Err(_) => false,
        }
    }

    pub async fn size(&self, key: &str) -> StorageResult<u64> {
        self.current_strategy().await?.size(key).await
    }

    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let strategy = self.current_strategy().await?;
        tracing::debug!(strategy = strategy.name(), key = %key, "Dispatching delete");
        strategy.delete(key).await;
        Ok(())
    }

    pub async fn read_chunk(&self, key: &str, start: u64, end: u64) -> StorageResult<Bytes> {
        self.current_strategy().await?.read_chunk(key, start, end).await
    }

    pub async fn open(&self, key: &str) -> StorageResult<ByteStream> {
        self.current_strategy().await?.open(key).await
    }

    /// Availability of the active strategy
    pub async fn is_available(&self) -> bool {
        match self.current_strategy().await {
            Ok(strategy) => strategy.is_available().await,
            Err(_) => false,
        }
    }

    /// Disk capacity behind the active strategy; `None` for remote backends
    pub async fn disk_usage(&self) -> Option<DiskUsage> {
        match self.current_strategy().await {
            Ok(strategy) => strategy.disk_usage().await,
            Err(_) => None,
        }
    }

    pub async fn supports_streaming(&self, key: &str) -> StorageResult<bool> {
        Ok(self.current_strategy().await?.supports_streaming(key))
    }

    pub async fn optimal_chunk_size(&self, key: &str) -> StorageResult<u64> {
        Ok(self.current_strategy().await?.optimal_chunk_size(key))
    }

    /// Copy `keys` from one strategy to another under the same key.
    ///
    /// Returns old key → new key. The first failing key aborts the batch; keys
    /// copied before it remain in the destination.
    pub async fn migrate(
        &self,
        from: &str,
        to: &str,
        keys: &[String],
    ) -> StorageResult<HashMap<String, String>> {
        let source = self.lookup(from.trim())?.clone();
        let destination = self.lookup(to.trim())?.clone();

        for strategy in [&source, &destination] {
            if !strategy.is_available().await {
                return Err(StorageError::Unavailable(strategy.name().to_string()));
            }
        }

        let start = std::time::Instant::now();
        let mut migrated = HashMap::with_capacity(keys.len());

        for key in keys {
            let copy = async {
                let data = source.read_all(key).await?;
                destination
                    .put(key, data, content_type_for_key(key))
                    .await
            };

            if let Err(e) = copy.await {
                tracing::error!(
                    from = source.name(),
                    to = destination.name(),
                    key = %key,
                    error = %e,
                    migrated = migrated.len(),
                    "Storage migration failed"
                );
                return Err(StorageError::MigrationFailed {
                    key: key.clone(),
                    source: Box::new(e),
                });
            }

            migrated.insert(key.clone(), key.clone());
        }

        tracing::info!(
            from = source.name(),
            to = destination.name(),
            files = migrated.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Storage migration completed"
        );

        Ok(migrated)
    }
}
