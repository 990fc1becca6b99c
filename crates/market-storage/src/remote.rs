use crate::keys::{validate_key, KeyLayout};
use crate::policy::UploadPolicy;
use crate::traits::{
    checked_chunk_end, ByteStream, MediaUpload, StorageError, StorageResult, StorageStrategy,
    StoredMedia,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use market_core::{ObjectStoreConfig, StorageBackend, UploadTarget};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{DynObjectStore, ObjectStoreExt, PutPayload};
use std::sync::Arc;

const OBJECT_STORE_CHUNK: u64 = 512 * 1024;
const HEALTH_CHECK_KEY: &str = ".health-check";

/// Remote object store (S3-compatible) strategy
///
/// An instance built without bucket or credentials stays registered but reports
/// itself unavailable, and every operation fails with `Unavailable`.
#[derive(Clone)]
pub struct ObjectStorageStrategy {
    store: Option<Arc<DynObjectStore>>,
    bucket: String,
    layout: KeyLayout,
    policy: Arc<UploadPolicy>,
}

impl ObjectStorageStrategy {
    /// Build an S3 client from configuration.
    ///
    /// Missing bucket or credentials yield an unavailable strategy; a client that
    /// fails to build is a configuration error.
    pub fn from_config(
        config: &ObjectStoreConfig,
        layout: KeyLayout,
        policy: Arc<UploadPolicy>,
    ) -> StorageResult<Self> {
        let (Some(bucket), Some(access_key), Some(secret)) = (
            config.bucket.clone(),
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
        ) else {
            tracing::warn!("Object store bucket or credentials not configured; strategy unavailable");
            return Ok(Self::unconfigured(layout, policy));
        };

        let mut builder = AmazonS3Builder::from_env()
            .with_region(config.region.clone())
            .with_bucket_name(bucket.clone())
            .with_access_key_id(access_key)
            .with_secret_access_key(secret);

        if let Some(ref endpoint) = config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "Object store client configured"
        );

        Ok(Self::with_store(Arc::new(store), bucket, layout, policy))
    }

    /// Wrap an existing object store client.
    pub fn with_store(
        store: Arc<DynObjectStore>,
        bucket: impl Into<String>,
        layout: KeyLayout,
        policy: Arc<UploadPolicy>,
    ) -> Self {
        Self {
            store: Some(store),
            bucket: bucket.into(),
            layout,
            policy,
        }
    }

    pub fn unconfigured(layout: KeyLayout, policy: Arc<UploadPolicy>) -> Self {
        Self {
            store: None,
            bucket: String::new(),
            layout,
            policy,
        }
    }

    fn client(&self) -> StorageResult<&Arc<DynObjectStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable(self.name().to_string()))
    }

    fn location(key: &str) -> StorageResult<Path> {
        validate_key(key)?;
        Ok(Path::from(key))
    }

    fn map_error(&self, err: ObjectStoreError, key: &str, operation: &str) -> StorageError {
        match err {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    operation = operation,
                    "Object store request failed"
                );
                StorageError::Backend(other.to_string())
            }
        }
    }
}

#[async_trait]
impl StorageStrategy for ObjectStorageStrategy {
    fn name(&self) -> &'static str {
        StorageBackend::ObjectStore.as_str()
    }

    fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    async fn store(&self, upload: MediaUpload, target: UploadTarget) -> StorageResult<StoredMedia> {
        let size = upload.size();
        let (media_type, extension) =
            self.policy
                .validate(&upload.filename, &upload.content_type, size, target)?;

        let key = self.layout.generate(target, &extension);
        self.put(&key, upload.data, &upload.content_type).await?;

        Ok(StoredMedia {
            key,
            media_type,
            size_bytes: size,
        })
    }

    async fn exists(&self, key: &str) -> bool {
        let (Ok(store), Ok(location)) = (self.client(), Self::location(key)) else {
            return false;
        };
        store.head(&location).await.is_ok()
    }

    async fn size(&self, key: &str) -> StorageResult<u64> {
        let store = self.client()?;
        let location = Self::location(key)?;
        let meta = store
            .head(&location)
            .await
            .map_err(|e| self.map_error(e, key, "head"))?;
        Ok(meta.size)
    }

    async fn delete(&self, key: &str) {
        let (Ok(store), Ok(location)) = (self.client(), Self::location(key)) else {
            tracing::warn!(key = %key, "Object store delete skipped");
            return;
        };
        let start = std::time::Instant::now();

        match store.delete(&location).await {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store delete successful"
                );
            }
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(key = %key, "Delete of missing object ignored");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "Object store delete failed"
                );
            }
        }
    }

    async fn read_chunk(&self, key: &str, start: u64, end: u64) -> StorageResult<Bytes> {
        let size = self.size(key).await?;
        let end = checked_chunk_end(start, end, size)?;
        let store = self.client()?;
        let location = Self::location(key)?;

        let bytes = store
            .get_range(&location, start..end + 1)
            .await
            .map_err(|e| self.map_error(e, key, "get_range"))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            start = start,
            end = end,
            size_bytes = bytes.len(),
            "Object store ranged read"
        );

        Ok(bytes)
    }

    async fn open(&self, key: &str) -> StorageResult<ByteStream> {
        let store = self.client()?;
        let location = Self::location(key)?;

        let result = store
            .get(&location)
            .await
            .map_err(|e| self.map_error(e, key, "get"))?;

        let bucket = self.bucket.clone();
        let key = key.to_string();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Object store stream read error"
                );
                StorageError::Backend(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }

    async fn is_available(&self) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };

        match store.head(&Path::from(HEALTH_CHECK_KEY)).await {
            Ok(_) | Err(ObjectStoreError::NotFound { .. }) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    "Object store availability check failed"
                );
                false
            }
        }
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let store = self.client()?;
        let location = Self::location(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| self.map_error(e, key, "put"))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(())
    }

    async fn read_all(&self, key: &str) -> StorageResult<Bytes> {
        let store = self.client()?;
        let location = Self::location(key)?;

        let result = store
            .get(&location)
            .await
            .map_err(|e| self.map_error(e, key, "get"))?;

        result
            .bytes()
            .await
            .map_err(|e| self.map_error(e, key, "get"))
    }

    fn optimal_chunk_size(&self, _key: &str) -> u64 {
        OBJECT_STORE_CHUNK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn strategy() -> ObjectStorageStrategy {
        ObjectStorageStrategy::with_store(
            Arc::new(InMemory::new()),
            "test-bucket",
            KeyLayout::default(),
            Arc::new(UploadPolicy::default()),
        )
    }

    #[tokio::test]
    async fn test_store_and_ranged_read() {
        let storage = strategy();
        let stored = storage
            .store(
                MediaUpload::new("clip.mp4", "video/mp4", Bytes::from_static(b"0123456789")),
                UploadTarget::ItemMedia {
                    shop_id: 2,
                    item_id: 8,
                },
            )
            .await
            .unwrap();

        assert!(stored.key.starts_with("items/shop-2/item-8-"));
        assert!(storage.exists(&stored.key).await);
        assert_eq!(storage.size(&stored.key).await.unwrap(), 10);
        assert_eq!(
            storage.read_chunk(&stored.key, 2, 5).await.unwrap(),
            Bytes::from_static(b"2345")
        );
        assert_eq!(
            storage.read_chunk(&stored.key, 0, 100).await.unwrap().len(),
            10
        );
    }

    #[tokio::test]
    async fn test_missing_object() {
        let storage = strategy();
        assert!(!storage.exists("items/shop-1/none.mp4").await);
        assert!(matches!(
            storage.size("items/shop-1/none.mp4").await,
            Err(StorageError::NotFound(_))
        ));
        storage.delete("items/shop-1/none.mp4").await;
        assert!(storage.is_available().await);
    }

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let storage =
            ObjectStorageStrategy::unconfigured(KeyLayout::default(), Arc::new(UploadPolicy::default()));
        assert!(!storage.is_available().await);
        assert!(!storage.exists("items/a.png").await);
        assert!(matches!(
            storage.read_all("items/a.png").await,
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.optimal_chunk_size("a.mp4"), 512 * 1024);
    }

    #[tokio::test]
    async fn test_from_config_without_credentials() {
        let storage = ObjectStorageStrategy::from_config(
            &ObjectStoreConfig::default(),
            KeyLayout::default(),
            Arc::new(UploadPolicy::default()),
        )
        .unwrap();
        assert!(!storage.is_available().await);
    }
}
