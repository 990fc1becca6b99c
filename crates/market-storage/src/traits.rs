//! Storage strategy abstraction
//!
//! This module defines the `StorageStrategy` trait that every backend implements,
//! along with the error type shared by all storage operations.

use crate::disk::DiskUsage;
use crate::keys::KeyLayout;
use crate::media_types;
use crate::policy::PolicyViolation;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use market_core::MediaType;
use market_core::UploadTarget;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid range {start}-{end} for resource of {size} bytes")]
    InvalidRange { start: u64, end: u64, size: u64 },

    #[error(transparent)]
    PolicyViolation(#[from] PolicyViolation),

    #[error("Storage strategy '{0}' is not available")]
    Unavailable(String),

    #[error("Unknown storage strategy: {0}")]
    UnknownStrategy(String),

    #[error("No active storage strategy")]
    NoActiveStrategy,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Migration failed for key '{key}': {source}")]
    MigrationFailed {
        key: String,
        #[source]
        source: Box<StorageError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streamed object body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// An upload as received from the client, before validation.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl MediaUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of a successful `store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub key: String,
    pub media_type: MediaType,
    pub size_bytes: u64,
}

/// Storage strategy trait
///
/// Implementations must be externally indistinguishable apart from `name()`:
/// the same inputs yield the same key layout, the same errors and the same bytes.
///
/// Keys never contain `..` or start with `/`; such keys fail with
/// [`StorageError::InvalidKey`] (or yield `false` from `exists`).
#[async_trait]
pub trait StorageStrategy: Send + Sync {
    /// Registry name ("local", "object-store")
    fn name(&self) -> &'static str;

    /// Key prefixes used by this strategy
    fn layout(&self) -> &KeyLayout;

    /// Validate an upload against the policy, generate a unique key under the
    /// target's namespace and write the bytes. Nothing is written on rejection.
    async fn store(&self, upload: MediaUpload, target: UploadTarget) -> StorageResult<StoredMedia>;

    /// Whether the key resolves to a stored object. Never fails.
    async fn exists(&self, key: &str) -> bool;

    /// Size in bytes of the stored object
    async fn size(&self, key: &str) -> StorageResult<u64>;

    /// Remove the object. Missing keys and backend failures are logged, not returned.
    async fn delete(&self, key: &str);

    /// Read the inclusive byte range `start..=end`. `end` is clamped to the
    /// last byte; a short read returns fewer bytes.
    async fn read_chunk(&self, key: &str, start: u64, end: u64) -> StorageResult<Bytes>;

    /// Open the full object as a byte stream
    async fn open(&self, key: &str) -> StorageResult<ByteStream>;

    /// Liveness check. Never fails.
    async fn is_available(&self) -> bool;

    /// Capacity of the disk holding this strategy's data, when it has one
    async fn disk_usage(&self) -> Option<DiskUsage> {
        None
    }

    /// Write bytes under an explicit key (used by migration)
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Read the whole object into memory
    async fn read_all(&self, key: &str) -> StorageResult<Bytes>;

    /// Preferred read size for streaming this key
    fn optimal_chunk_size(&self, key: &str) -> u64;

    fn supports_streaming(&self, key: &str) -> bool {
        media_types::supports_streaming(key)
    }
}

/// Validate a `read_chunk` request against the object size and return the
/// clamped inclusive end.
pub(crate) fn checked_chunk_end(start: u64, end: u64, size: u64) -> StorageResult<u64> {
    if start >= size || start > end {
        return Err(StorageError::InvalidRange { start, end, size });
    }
    Ok(end.min(size - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_chunk_end_clamps_and_rejects() {
        assert_eq!(checked_chunk_end(2, 5, 10).unwrap(), 5);
        assert_eq!(checked_chunk_end(0, 100, 10).unwrap(), 9);
        assert!(matches!(
            checked_chunk_end(10, 12, 10),
            Err(StorageError::InvalidRange { .. })
        ));
        assert!(matches!(
            checked_chunk_end(6, 5, 10),
            Err(StorageError::InvalidRange { .. })
        ));
        assert!(checked_chunk_end(0, 0, 0).is_err());
    }
}
