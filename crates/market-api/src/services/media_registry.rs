//! Owner → storage key registry.
//!
//! Shops and items reference their media by storage key. The entity service owns
//! that mapping; `InMemoryMediaRegistry` is the in-process implementation used by
//! this service.

use async_trait::async_trait;
use market_core::OwnerId;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMediaRecord {
    pub shop_id: OwnerId,
    pub key: String,
}

/// Recording a key returns the key it replaced so the caller can clean it up.
#[async_trait]
pub trait MediaRegistry: Send + Sync {
    async fn record_shop_profile(&self, shop_id: OwnerId, key: String) -> Option<String>;

    async fn shop_profile(&self, shop_id: OwnerId) -> Option<String>;

    async fn remove_shop_profile(&self, shop_id: OwnerId) -> Option<String>;

    async fn record_item_media(
        &self,
        item_id: OwnerId,
        shop_id: OwnerId,
        key: String,
    ) -> Option<String>;

    async fn item_media(&self, item_id: OwnerId) -> Option<ItemMediaRecord>;

    async fn remove_item_media(&self, item_id: OwnerId) -> Option<String>;
}

#[derive(Default)]
pub struct InMemoryMediaRegistry {
    shop_profiles: RwLock<HashMap<OwnerId, String>>,
    item_media: RwLock<HashMap<OwnerId, ItemMediaRecord>>,
}

impl InMemoryMediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaRegistry for InMemoryMediaRegistry {
    async fn record_shop_profile(&self, shop_id: OwnerId, key: String) -> Option<String> {
        self.shop_profiles.write().await.insert(shop_id, key)
    }

    async fn shop_profile(&self, shop_id: OwnerId) -> Option<String> {
        self.shop_profiles.read().await.get(&shop_id).cloned()
    }

    async fn remove_shop_profile(&self, shop_id: OwnerId) -> Option<String> {
        self.shop_profiles.write().await.remove(&shop_id)
    }

    async fn record_item_media(
        &self,
        item_id: OwnerId,
        shop_id: OwnerId,
        key: String,
    ) -> Option<String> {
        self.item_media
            .write()
            .await
            .insert(item_id, ItemMediaRecord { shop_id, key })
            .map(|previous| previous.key)
    }

    async fn item_media(&self, item_id: OwnerId) -> Option<ItemMediaRecord> {
        self.item_media.read().await.get(&item_id).cloned()
    }

    async fn remove_item_media(&self, item_id: OwnerId) -> Option<String> {
        self.item_media
            .write()
            .await
            .remove(&item_id)
            .map(|record| record.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replacing_returns_previous_key() {
        let registry = InMemoryMediaRegistry::new();
        assert_eq!(registry.record_shop_profile(1, "a".into()).await, None);
        assert_eq!(
            registry.record_shop_profile(1, "b".into()).await,
            Some("a".to_string())
        );
        assert_eq!(registry.shop_profile(1).await, Some("b".to_string()));
        assert_eq!(registry.remove_shop_profile(1).await, Some("b".to_string()));
        assert_eq!(registry.shop_profile(1).await, None);
    }

    #[tokio::test]
    async fn test_item_media_keeps_shop() {
        let registry = InMemoryMediaRegistry::new();
        registry.record_item_media(5, 2, "k1".into()).await;
        assert_eq!(
            registry.item_media(5).await,
            Some(ItemMediaRecord {
                shop_id: 2,
                key: "k1".to_string()
            })
        );
        assert_eq!(
            registry.record_item_media(5, 2, "k2".into()).await,
            Some("k1".to_string())
        );
        assert_eq!(registry.remove_item_media(5).await, Some("k2".to_string()));
        assert_eq!(registry.remove_item_media(5).await, None);
    }
}
