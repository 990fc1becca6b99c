use crate::context::StorageContext;
use crate::keys::KeyLayout;
use crate::local::LocalStorageStrategy;
use crate::policy::UploadPolicy;
use crate::remote::ObjectStorageStrategy;
use crate::{StorageResult, StorageStrategy};
use market_core::Config;
use std::sync::Arc;

/// Build every strategy from configuration, register them, and activate the
/// configured default. Fails if the default strategy is unavailable.
pub async fn create_storage_context(config: &Config) -> StorageResult<StorageContext> {
    let storage = config.storage();
    let policy = Arc::new(UploadPolicy::from_config(config.media_policy()));

    let local = LocalStorageStrategy::new(
        storage.upload_dir.clone(),
        KeyLayout::new(storage.shop_profiles_dir.clone(), storage.items_dir.clone()),
        policy.clone(),
    )
    .await?;

    let remote = ObjectStorageStrategy::from_config(
        &storage.object_store,
        KeyLayout::new(
            storage.object_store.shop_profiles_prefix.clone(),
            storage.object_store.items_prefix.clone(),
        ),
        policy,
    )?;

    let strategies: Vec<Arc<dyn StorageStrategy>> = vec![Arc::new(local), Arc::new(remote)];
    let context = StorageContext::new(strategies);

    context
        .set_strategy(config.default_strategy().as_str())
        .await?;

    Ok(context)
}
