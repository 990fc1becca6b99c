//! Upload integration tests.
//!
//! Run with: `cargo test -p market-api --test upload_test`

mod helpers;

use helpers::{setup_test_app, upload_form, upload_shop_profile, MAX_IMAGE_BYTES};
use market_api::services::media_registry::MediaRegistry;

#[tokio::test]
async fn test_upload_shop_profile() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/files/upload/shop-profile")
        .multipart(upload_form(b"png-bytes", "Logo.PNG", "image/png", &[("shopId", "7")]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let key = body["storageKey"].as_str().expect("storageKey");
    assert!(key.starts_with("shop-profiles/shop-7/profile-"));
    assert!(key.ends_with(".png"));
    assert_eq!(body["mediaType"], "IMAGE");
    assert!(app.storage().exists(key).await);
}

#[tokio::test]
async fn test_upload_item_video() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/files/upload/item-media")
        .multipart(upload_form(
            b"fake-mp4-data",
            "clip.mp4",
            "video/mp4",
            &[("shopId", "2"), ("itemId", "9")],
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["mediaType"], "VIDEO");
    let key = body["storageKey"].as_str().expect("storageKey");
    assert!(key.starts_with("items/shop-2/item-9-"));

    let stream = client.get("/files/item/9/media").await;
    assert_eq!(stream.status_code(), 200);
    assert_eq!(stream.header("content-type"), "video/mp4");
    assert_eq!(stream.as_bytes().as_ref(), b"fake-mp4-data");
}

#[tokio::test]
async fn test_video_rejected_for_shop_profile() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/files/upload/shop-profile")
        .multipart(upload_form(b"video", "clip.mp4", "video/mp4", &[("shopId", "1")]))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_disallowed_extension_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/files/upload/item-media")
        .multipart(upload_form(
            b"data",
            "image.bmp",
            "image/bmp",
            &[("shopId", "1"), ("itemId", "2")],
        ))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_oversized_image_rejected() {
    let app = setup_test_app().await;
    let data = vec![0u8; (MAX_IMAGE_BYTES + 1) as usize];

    let response = app
        .client()
        .post("/files/upload/shop-profile")
        .multipart(upload_form(&data, "big.png", "image/png", &[("shopId", "1")]))
        .await;

    assert_eq!(response.status_code(), 413);
}

#[tokio::test]
async fn test_body_over_request_limit_is_payload_too_large() {
    let app = setup_test_app().await;
    let data = vec![0u8; 8 * 1024 * 1024];

    let response = app
        .client()
        .post("/files/upload/item-media")
        .multipart(upload_form(
            &data,
            "a.mp4",
            "video/mp4",
            &[("shopId", "1"), ("itemId", "2")],
        ))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.state.registry.item_media(2).await.is_none());
}

#[tokio::test]
async fn test_empty_file_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/files/upload/shop-profile")
        .multipart(upload_form(b"", "empty.png", "image/png", &[("shopId", "1")]))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_missing_owner_field_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/files/upload/shop-profile")
        .multipart(upload_form(b"png", "a.png", "image/png", &[]))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = client
        .post("/files/upload/item-media")
        .multipart(upload_form(b"png", "a.png", "image/png", &[("shopId", "1")]))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = client
        .post("/files/upload/shop-profile")
        .multipart(upload_form(b"png", "a.png", "image/png", &[("shopId", "abc")]))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_replacing_profile_deletes_previous_object() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = upload_shop_profile(client, 5, b"first").await;
    let second = upload_shop_profile(client, 5, b"second").await;

    assert_ne!(first, second);
    assert!(!app.storage().exists(&first).await);
    assert!(app.storage().exists(&second).await);

    let response = client.get("/files/shop/5/profile").await;
    assert_eq!(response.as_bytes().as_ref(), b"second");
}
