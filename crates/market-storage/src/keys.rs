//! Shared key generation for storage strategies.
//!
//! Key format:
//! - shop profile: `{shop_profiles}/shop-{shopId}/profile-{uuid}.{ext}`
//! - item media: `{items}/shop-{shopId}/item-{itemId}-{uuid}.{ext}`

use crate::traits::{StorageError, StorageResult};
use market_core::{OwnerId, UploadTarget};
use uuid::Uuid;

/// Top-level namespace of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    ShopProfiles,
    Items,
}

/// Per-strategy key prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    shop_profiles: String,
    items: String,
}

impl KeyLayout {
    pub fn new(shop_profiles: impl Into<String>, items: impl Into<String>) -> Self {
        Self {
            shop_profiles: shop_profiles.into().trim_matches('/').to_string(),
            items: items.into().trim_matches('/').to_string(),
        }
    }

    pub fn prefix(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::ShopProfiles => &self.shop_profiles,
            Namespace::Items => &self.items,
        }
    }

    /// Generate a fresh, unique key for an upload with the given extension.
    pub fn generate(&self, target: UploadTarget, extension: &str) -> String {
        let id = Uuid::new_v4();
        match target {
            UploadTarget::ShopProfile { shop_id } => format!(
                "{}/shop-{}/profile-{}.{}",
                self.shop_profiles, shop_id, id, extension
            ),
            UploadTarget::ItemMedia { shop_id, item_id } => format!(
                "{}/shop-{}/item-{}-{}.{}",
                self.items, shop_id, item_id, id, extension
            ),
        }
    }

    /// Key of a file addressed by shop and bare filename.
    pub fn relative(
        &self,
        namespace: Namespace,
        shop_id: OwnerId,
        filename: &str,
    ) -> StorageResult<String> {
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(StorageError::InvalidKey(filename.to_string()));
        }
        let key = format!("{}/shop-{}/{}", self.prefix(namespace), shop_id, filename);
        validate_key(&key)?;
        Ok(key)
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("shop-profiles", "items")
    }
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_follow_layout() {
        let layout = KeyLayout::default();
        let key = layout.generate(UploadTarget::ShopProfile { shop_id: 12 }, "png");
        assert!(key.starts_with("shop-profiles/shop-12/profile-"));
        assert!(key.ends_with(".png"));

        let key = layout.generate(
            UploadTarget::ItemMedia {
                shop_id: 3,
                item_id: 44,
            },
            "mp4",
        );
        assert!(key.starts_with("items/shop-3/item-44-"));
        assert!(key.ends_with(".mp4"));
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let layout = KeyLayout::default();
        let target = UploadTarget::ShopProfile { shop_id: 1 };
        assert_ne!(layout.generate(target, "jpg"), layout.generate(target, "jpg"));
    }

    #[test]
    fn test_relative_rejects_traversal() {
        let layout = KeyLayout::new("/profiles/", "media");
        assert_eq!(
            layout.relative(Namespace::ShopProfiles, 5, "a.png").unwrap(),
            "profiles/shop-5/a.png"
        );
        assert!(layout.relative(Namespace::Items, 5, "..").is_err());
        assert!(layout.relative(Namespace::Items, 5, "x/../../etc").is_err());
        assert!(validate_key("/etc/passwd").is_err());
    }
}
