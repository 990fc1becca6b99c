//! Media domain models shared by storage and API layers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Database identifier of a shop or item owned by the entity service.
pub type OwnerId = i64;

/// Classification attached to stored media for client rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify a declared content type. Returns `None` for anything that is
    /// neither `image/*` nor `video/*`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let normalized = content_type.trim().to_lowercase();
        if normalized.starts_with("image/") {
            Some(MediaType::Image)
        } else if normalized.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "IMAGE"),
            MediaType::Video => write!(f, "VIDEO"),
        }
    }
}

/// Who an upload belongs to. Determines the key namespace and which media
/// classes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Shop profile picture; images only.
    ShopProfile { shop_id: OwnerId },
    /// Media attached to an item; images or videos.
    ItemMedia { shop_id: OwnerId, item_id: OwnerId },
}

impl UploadTarget {
    pub fn shop_id(&self) -> OwnerId {
        match self {
            UploadTarget::ShopProfile { shop_id } => *shop_id,
            UploadTarget::ItemMedia { shop_id, .. } => *shop_id,
        }
    }

    pub fn accepts(&self, media_type: MediaType) -> bool {
        match self {
            UploadTarget::ShopProfile { .. } => media_type == MediaType::Image,
            UploadTarget::ItemMedia { .. } => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadTarget::ShopProfile { .. } => "shop-profile",
            UploadTarget::ItemMedia { .. } => "item-media",
        }
    }
}
