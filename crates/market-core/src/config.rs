//! Configuration module
//!
//! This module provides configuration structures for the media API: server
//! settings, storage strategy settings, and the upload policy.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8080;
const MAX_IMAGE_SIZE_MB: u64 = 5;
const MAX_VIDEO_SIZE_MB: u64 = 50;
/// Default upper bound on a single ranged response body.
pub const DEFAULT_STREAM_MAX_CHUNK_BYTES: u64 = 1024 * 1024;
/// Upload-directory disk usage above which `/health` reports the service down.
pub const DEFAULT_DISK_USAGE_THRESHOLD_PERCENT: f64 = 90.0;
const BYTES_PER_MB: u64 = 1024 * 1024;
const DEFAULT_IMAGE_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp";
const DEFAULT_VIDEO_EXTENSIONS: &str = "mp4,avi,mov,wmv,flv,webm,mkv";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}

/// Remote object store (S3-compatible) settings
#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    pub bucket: Option<String>,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub shop_profiles_prefix: String,
    pub items_prefix: String,
}

impl ObjectStoreConfig {
    /// Bucket and both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.bucket.as_deref().is_some_and(|b| !b.trim().is_empty())
            && self.access_key_id.is_some()
            && self.secret_access_key.is_some()
    }
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            shop_profiles_prefix: "shop-profiles".to_string(),
            items_prefix: "items".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub default_strategy: StorageBackend,
    pub upload_dir: PathBuf,
    pub shop_profiles_dir: String,
    pub items_dir: String,
    pub stream_max_chunk_bytes: u64,
    pub disk_usage_threshold_percent: f64,
    pub object_store: ObjectStoreConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_strategy: StorageBackend::Local,
            upload_dir: PathBuf::from("uploads"),
            shop_profiles_dir: "shop-profiles".to_string(),
            items_dir: "items".to_string(),
            stream_max_chunk_bytes: DEFAULT_STREAM_MAX_CHUNK_BYTES,
            disk_usage_threshold_percent: DEFAULT_DISK_USAGE_THRESHOLD_PERCENT,
            object_store: ObjectStoreConfig::default(),
        }
    }
}

/// Upload acceptance rules
#[derive(Clone, Debug)]
pub struct MediaPolicyConfig {
    pub max_image_size_bytes: u64,
    pub max_video_size_bytes: u64,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for MediaPolicyConfig {
    fn default() -> Self {
        Self {
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * BYTES_PER_MB,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
            image_extensions: split_list(DEFAULT_IMAGE_EXTENSIONS),
            video_extensions: split_list(DEFAULT_VIDEO_EXTENSIONS),
        }
    }
}

/// Full media service configuration
#[derive(Clone, Debug, Default)]
pub struct MarketConfig {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub media_policy: MediaPolicyConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MarketConfig>);

impl Config {
    pub fn new(config: MarketConfig) -> Self {
        Config(Box::new(config))
    }

    fn inner(&self) -> &MarketConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MarketConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.inner().storage
    }

    pub fn default_strategy(&self) -> StorageBackend {
        self.inner().storage.default_strategy
    }

    pub fn stream_max_chunk_bytes(&self) -> u64 {
        self.inner().storage.stream_max_chunk_bytes
    }

    pub fn media_policy(&self) -> &MediaPolicyConfig {
        &self.inner().media_policy
    }

    /// Largest accepted upload of any class; used to size the body limit.
    pub fn max_upload_bytes(&self) -> u64 {
        let policy = self.media_policy();
        policy.max_image_size_bytes.max(policy.max_video_size_bytes)
    }
}

impl MarketConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let default_strategy = env::var("STORAGE_STRATEGY")
            .unwrap_or_else(|_| StorageBackend::Local.as_str().to_string())
            .parse::<StorageBackend>()?;

        let max_image_size_mb = env::var("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);
        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        Ok(MarketConfig {
            base: BaseConfig {
                server_port: env::var("PORT")
                    .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_PORT),
                cors_origins: split_list(&cors_origins_str),
                environment,
            },
            storage: StorageConfig {
                default_strategy,
                upload_dir: PathBuf::from(
                    env::var("FILE_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                ),
                shop_profiles_dir: env::var("FILE_UPLOAD_SHOP_PROFILES_DIR")
                    .unwrap_or_else(|_| "shop-profiles".to_string()),
                items_dir: env::var("FILE_UPLOAD_ITEMS_DIR")
                    .unwrap_or_else(|_| "items".to_string()),
                stream_max_chunk_bytes: env::var("STREAM_MAX_CHUNK_BYTES")
                    .unwrap_or_else(|_| DEFAULT_STREAM_MAX_CHUNK_BYTES.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_STREAM_MAX_CHUNK_BYTES),
                disk_usage_threshold_percent: env::var("DISK_USAGE_THRESHOLD_PERCENT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DISK_USAGE_THRESHOLD_PERCENT),
                object_store: ObjectStoreConfig {
                    bucket: env::var("S3_BUCKET").ok().filter(|s| !s.trim().is_empty()),
                    region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                    endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
                    access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
                    secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
                    shop_profiles_prefix: env::var("S3_SHOP_PROFILES_PREFIX")
                        .unwrap_or_else(|_| "shop-profiles".to_string()),
                    items_prefix: env::var("S3_ITEMS_PREFIX")
                        .unwrap_or_else(|_| "items".to_string()),
                },
            },
            media_policy: MediaPolicyConfig {
                max_image_size_bytes: megabytes_to_bytes("MAX_IMAGE_SIZE_MB", max_image_size_mb)?,
                max_video_size_bytes: megabytes_to_bytes("MAX_VIDEO_SIZE_MB", max_video_size_mb)?,
                image_extensions: split_list(
                    &env::var("IMAGE_ALLOWED_EXTENSIONS")
                        .unwrap_or_else(|_| DEFAULT_IMAGE_EXTENSIONS.to_string()),
                ),
                video_extensions: split_list(
                    &env::var("VIDEO_ALLOWED_EXTENSIONS")
                        .unwrap_or_else(|_| DEFAULT_VIDEO_EXTENSIONS.to_string()),
                ),
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.stream_max_chunk_bytes == 0 {
            return Err(anyhow::anyhow!(
                "STREAM_MAX_CHUNK_BYTES must be greater than zero"
            ));
        }

        if self.media_policy.max_image_size_bytes == 0 || self.media_policy.max_video_size_bytes == 0
        {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        let threshold = self.storage.disk_usage_threshold_percent;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(anyhow::anyhow!(
                "DISK_USAGE_THRESHOLD_PERCENT must be between 0 and 100, got {}",
                threshold
            ));
        }

        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("FILE_UPLOAD_DIR cannot be empty"));
        }

        for prefix in [
            &self.storage.shop_profiles_dir,
            &self.storage.items_dir,
            &self.storage.object_store.shop_profiles_prefix,
            &self.storage.object_store.items_prefix,
        ] {
            if prefix.trim().is_empty() || prefix.contains("..") || prefix.starts_with('/') {
                return Err(anyhow::anyhow!("Invalid storage prefix: '{}'", prefix));
            }
        }

        if self.storage.default_strategy == StorageBackend::ObjectStore
            && !self.storage.object_store.is_configured()
        {
            return Err(anyhow::anyhow!(
                "STORAGE_STRATEGY=object-store requires S3_BUCKET, AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
            ));
        }

        if is_production_env(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn megabytes_to_bytes(name: &str, megabytes: u64) -> Result<u64, anyhow::Error> {
    megabytes
        .checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("{}={} overflows a byte count", name, megabytes))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
