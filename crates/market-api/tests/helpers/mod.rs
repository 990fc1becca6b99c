//! Test helpers: build AppState and router for integration tests.
//!
//! Both strategies are real: `local` writes into a temp dir and `object-store`
//! wraps an in-memory object store, so no external services are needed.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use market_api::services::media_registry::{InMemoryMediaRegistry, MediaRegistry};
use market_api::setup;
use market_api::state::AppState;
use market_core::config::MarketConfig;
use market_core::Config;
use market_storage::{
    KeyLayout, LocalStorageStrategy, ObjectStorageStrategy, StorageContext, StorageStrategy,
    UploadPolicy,
};
use object_store::memory::InMemory;
use object_store::DynObjectStore;
use std::sync::Arc;
use tempfile::TempDir;

pub const MAX_IMAGE_BYTES: u64 = 1024;
pub const MAX_VIDEO_BYTES: u64 = 4096;

/// Test application: server, shared state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage(&self) -> &StorageContext {
        &self.state.storage
    }
}

fn test_config(temp_dir: &TempDir, configure: impl FnOnce(&mut MarketConfig)) -> Config {
    let mut config = MarketConfig::default();
    config.storage.upload_dir = temp_dir.path().to_path_buf();
    config.media_policy.max_image_size_bytes = MAX_IMAGE_BYTES;
    config.media_policy.max_video_size_bytes = MAX_VIDEO_BYTES;
    configure(&mut config);
    Config::new(config)
}

/// Local strategy active, object store reachable.
pub async fn setup_test_app() -> TestApp {
    build_test_app(true, |_| {}).await
}

/// Like [`setup_test_app`] with test-specific configuration overrides.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut MarketConfig)) -> TestApp {
    build_test_app(true, configure).await
}

/// Local strategy active, object store registered but unconfigured.
pub async fn setup_test_app_without_object_store() -> TestApp {
    build_test_app(false, |_| {}).await
}

async fn build_test_app(
    object_store_available: bool,
    configure: impl FnOnce(&mut MarketConfig),
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, configure);
    let policy = Arc::new(UploadPolicy::from_config(config.media_policy()));

    let local = LocalStorageStrategy::new(temp_dir.path(), KeyLayout::default(), policy.clone())
        .await
        .expect("Failed to create local strategy");

    let remote = if object_store_available {
        let store: Arc<DynObjectStore> = Arc::new(InMemory::new());
        ObjectStorageStrategy::with_store(store, "test-bucket", KeyLayout::default(), policy)
    } else {
        ObjectStorageStrategy::unconfigured(KeyLayout::default(), policy)
    };

    let strategies: Vec<Arc<dyn StorageStrategy>> = vec![Arc::new(local), Arc::new(remote)];
    let storage = Arc::new(StorageContext::new(strategies));
    storage
        .set_strategy("local")
        .await
        .expect("Failed to activate local strategy");

    let registry: Arc<dyn MediaRegistry> = Arc::new(InMemoryMediaRegistry::new());
    let (state, app) =
        setup::build_app(config, storage, registry).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one file part plus owner fields.
pub fn upload_form(
    data: &[u8],
    filename: &str,
    mime_type: &str,
    fields: &[(&str, &str)],
) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::copy_from_slice(data))
        .file_name(filename.to_string())
        .mime_type(mime_type.to_string());
    fields
        .iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name.to_string(), value.to_string())
        })
        .add_part("file", part)
}

/// Upload a shop profile picture and return its storage key.
pub async fn upload_shop_profile(client: &TestServer, shop_id: i64, data: &[u8]) -> String {
    let shop_id = shop_id.to_string();
    let response = client
        .post("/files/upload/shop-profile")
        .multipart(upload_form(data, "photo.png", "image/png", &[("shopId", &shop_id)]))
        .await;
    assert_eq!(response.status_code(), 200, "upload failed: {}", response.text());

    let body: serde_json::Value = response.json();
    body.get("storageKey")
        .and_then(|v| v.as_str())
        .expect("Expected 'storageKey' in upload response")
        .to_string()
}
