//! Market Storage Library
//!
//! Pluggable byte storage for shop profile images and item media, plus the
//! switchable context that dispatches to the active strategy.
//!
//! # Storage key format
//!
//! Both strategies use the same layout:
//!
//! - **Shop profile**: `{shop_profiles}/shop-{shopId}/profile-{uuid}.{ext}`
//! - **Item media**: `{items}/shop-{shopId}/item-{itemId}-{uuid}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module so all strategies stay consistent.

pub mod context;
pub mod disk;
pub mod factory;
pub mod keys;
pub mod local;
pub mod media_types;
pub mod policy;
pub mod range;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use context::{HealthStatus, StorageContext, StrategyDescriptor, NO_STRATEGY};
pub use disk::DiskUsage;
pub use factory::create_storage_context;
pub use keys::{KeyLayout, Namespace};
pub use local::LocalStorageStrategy;
pub use market_core::StorageBackend;
pub use policy::{PolicyViolation, UploadPolicy};
pub use range::{parse_range_header, ByteRange, RangeError};
pub use remote::ObjectStorageStrategy;
pub use traits::{
    ByteStream, MediaUpload, StorageError, StorageResult, StorageStrategy, StoredMedia,
};
