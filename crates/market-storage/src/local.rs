use crate::disk::{disk_usage_async, DiskUsage};
use crate::keys::{validate_key, KeyLayout};
use crate::policy::UploadPolicy;
use crate::traits::{
    checked_chunk_end, ByteStream, MediaUpload, StorageError, StorageResult, StorageStrategy,
    StoredMedia,
};
use crate::media_types::extension_of;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use market_core::{StorageBackend, UploadTarget};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use uuid::Uuid;

const LARGE_VIDEO_CHUNK: u64 = 1024 * 1024;
const MEDIUM_VIDEO_CHUNK: u64 = 512 * 1024;
const DEFAULT_CHUNK: u64 = 64 * 1024;

/// Local filesystem storage strategy
#[derive(Clone)]
pub struct LocalStorageStrategy {
    root: PathBuf,
    layout: KeyLayout,
    policy: Arc<UploadPolicy>,
}

impl LocalStorageStrategy {
    /// Create a strategy rooted at `root`, creating the directory if needed.
    pub async fn new(
        root: impl Into<PathBuf>,
        layout: KeyLayout,
        policy: Arc<UploadPolicy>,
    ) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorageStrategy {
            root,
            layout,
            policy,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_file(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path.display(),
                key = %key,
                "Failed to create file"
            );
            StorageError::Io(e)
        })?;
        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            tracing::error!(error = %e, path = %path.display(), key = %key, "Failed to write file");
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(
                    error = %cleanup,
                    path = %path.display(),
                    "Failed to remove partially written file"
                );
            }
            return Err(StorageError::Io(e));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn open_file(&self, key: &str) -> StorageResult<fs::File> {
        let path = self.key_to_path(key)?;
        fs::File::open(&path).await.map_err(|e| not_found_or_io(e, key))
    }
}

fn not_found_or_io(err: std::io::Error, key: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl StorageStrategy for LocalStorageStrategy {
    fn name(&self) -> &'static str {
        StorageBackend::Local.as_str()
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
        self.write_file(&key, &upload.data).await?;

        Ok(StoredMedia {
            key,
            media_type,
            size_bytes: size,
        })
    }

    async fn exists(&self, key: &str) -> bool {
        match self.key_to_path(key) {
            Ok(path) => fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn size(&self, key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, key))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(meta.len())
    }

    async fn delete(&self, key: &str) {
        let path = match self.key_to_path(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Refusing to delete invalid key");
                return;
            }
        };
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %key, "Delete of missing file ignored");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    key = %key,
                    "Local storage delete failed"
                );
            }
        }
    }

    async fn read_chunk(&self, key: &str, start: u64, end: u64) -> StorageResult<Bytes> {
        let size = self.size(key).await?;
        let end = checked_chunk_end(start, end, size)?;
        let len = end - start + 1;

        let mut file = self.open_file(key).await?;
        file.seek(SeekFrom::Start(start)).await?;

        let mut buf = Vec::with_capacity(len as usize);
        file.take(len).read_to_end(&mut buf).await?;

        tracing::debug!(
            key = %key,
            start = start,
            end = end,
            size_bytes = buf.len(),
            "Local storage chunk read"
        );

        Ok(Bytes::from(buf))
    }

    async fn open(&self, key: &str) -> StorageResult<ByteStream> {
        let file = self.open_file(key).await?;
        let key = key.to_string();

        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream read error");
                StorageError::Io(e)
            })
        });

        Ok(Box::pin(stream))
    }

    async fn is_available(&self) -> bool {
        if let Err(e) = fs::create_dir_all(&self.root).await {
            tracing::warn!(root = %self.root.display(), error = %e, "Storage root not creatable");
            return false;
        }

        let marker = self.root.join(format!(".write-check-{}", Uuid::new_v4()));
        match fs::write(&marker, b"ok").await {
            Ok(()) => {
                let _ = fs::remove_file(&marker).await;
                true
            }
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "Storage root not writable");
                false
            }
        }
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        self.write_file(key, &data).await
    }

    async fn read_all(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;
        let data = fs::read(&path).await.map_err(|e| not_found_or_io(e, key))?;
        Ok(Bytes::from(data))
    }

    async fn disk_usage(&self) -> Option<DiskUsage> {
        disk_usage_async(self.root.clone()).await
    }

    fn optimal_chunk_size(&self, key: &str) -> u64 {
        match extension_of(key).as_deref() {
            Some("mp4") | Some("webm") | Some("mov") => LARGE_VIDEO_CHUNK,
            Some("avi") | Some("mkv") | Some("wmv") => MEDIUM_VIDEO_CHUNK,
            _ => DEFAULT_CHUNK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn strategy(dir: &Path) -> LocalStorageStrategy {
        LocalStorageStrategy::new(dir, KeyLayout::default(), Arc::new(UploadPolicy::default()))
            .await
            .unwrap()
    }

    fn png(data: &'static [u8]) -> MediaUpload {
        MediaUpload::new("photo.png", "image/png", Bytes::from_static(data))
    }

    #[tokio::test]
    async fn test_store_then_read_back() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;

        let stored = storage
            .store(png(b"0123456789"), UploadTarget::ShopProfile { shop_id: 9 })
            .await
            .unwrap();

        assert!(stored.key.starts_with("shop-profiles/shop-9/profile-"));
        assert!(storage.exists(&stored.key).await);
        assert_eq!(storage.size(&stored.key).await.unwrap(), 10);
        assert_eq!(
            storage.read_chunk(&stored.key, 2, 5).await.unwrap(),
            Bytes::from_static(b"2345")
        );
        assert_eq!(
            storage.read_chunk(&stored.key, 8, 100).await.unwrap(),
            Bytes::from_static(b"89")
        );
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;

        let result = storage
            .store(
                MediaUpload::new("clip.mp4", "video/mp4", Bytes::from_static(b"abc")),
                UploadTarget::ShopProfile { shop_id: 1 },
            )
            .await;
        assert!(matches!(result, Err(StorageError::PolicyViolation(_))));
        assert!(!dir.path().join("shop-profiles").exists());
    }

    #[tokio::test]
    async fn test_read_chunk_errors() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;
        storage
            .put("items/shop-1/a.mp4", Bytes::from_static(b"0123456789"), "video/mp4")
            .await
            .unwrap();

        assert!(matches!(
            storage.read_chunk("items/shop-1/a.mp4", 10, 12).await,
            Err(StorageError::InvalidRange { .. })
        ));
        assert!(matches!(
            storage.read_chunk("items/shop-1/missing.mp4", 0, 1).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;
        storage
            .put("items/shop-1/a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();

        storage.delete("items/shop-1/a.png").await;
        storage.delete("items/shop-1/a.png").await;
        assert!(!storage.exists("items/shop-1/a.png").await);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;

        assert!(!storage.exists("../../../etc/passwd").await);
        assert!(matches!(
            storage.size("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.read_all("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_availability_and_chunk_hints() {
        let dir = tempdir().unwrap();
        let storage = strategy(&dir.path().join("nested/root")).await;
        assert!(storage.is_available().await);

        assert_eq!(storage.optimal_chunk_size("a.mp4"), 1024 * 1024);
        assert_eq!(storage.optimal_chunk_size("a.mkv"), 512 * 1024);
        assert_eq!(storage.optimal_chunk_size("a.png"), 64 * 1024);
        assert!(storage.supports_streaming("a.webm"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;

        // Writes through this link fail with ENOSPC.
        let target = dir.path().join("items/shop-1/a.png");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink("/dev/full", &target).unwrap();

        let result = storage
            .put("items/shop-1/a.png", Bytes::from_static(b"pixels"), "image/png")
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(std::fs::symlink_metadata(&target).is_err());
    }

    #[tokio::test]
    async fn test_disk_usage_of_root() {
        let dir = tempdir().unwrap();
        let storage = strategy(dir.path()).await;

        if let Some(usage) = storage.disk_usage().await {
            assert_eq!(usage.directory, dir.path().display().to_string());
            assert!(usage.total_bytes >= usage.free_bytes);
        }
    }
}
