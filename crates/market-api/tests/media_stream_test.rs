//! Range streaming integration tests.
//!
//! Run with: `cargo test -p market-api --test media_stream_test`

mod helpers;

use helpers::{setup_test_app, setup_test_app_with, upload_form, upload_shop_profile};
use market_storage::StorageStrategy;

const CONTENT: &[u8] = b"0123456789";

#[tokio::test]
async fn test_full_response_without_range() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let response = client.get("/files/shop/1/profile").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), CONTENT);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("accept-ranges"), "bytes");
    assert_eq!(response.header("content-length"), "10");
    assert!(response.maybe_header("content-range").is_none());
}

#[tokio::test]
async fn test_partial_response_for_range() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let response = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=2-5")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), b"2345");
    assert_eq!(response.header("content-range"), "bytes 2-5/10");
    assert_eq!(response.header("content-length"), "4");
}

#[tokio::test]
async fn test_open_ended_and_oversized_ranges_are_clamped() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let open_ended = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=7-")
        .await;
    assert_eq!(open_ended.status_code(), 206);
    assert_eq!(open_ended.as_bytes().as_ref(), b"789");
    assert_eq!(open_ended.header("content-range"), "bytes 7-9/10");

    let oversized = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=0-100")
        .await;
    assert_eq!(oversized.status_code(), 206);
    assert_eq!(oversized.as_bytes().as_ref(), CONTENT);
    assert_eq!(oversized.header("content-range"), "bytes 0-9/10");
}

#[tokio::test]
async fn test_unsatisfiable_range() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    for range in ["bytes=10-20", "bytes=5-2", "bytes=abc"] {
        let response = client
            .get("/files/shop/1/profile")
            .add_header("Range", range)
            .await;
        assert_eq!(response.status_code(), 416, "range {}", range);
        assert_eq!(response.header("content-range"), "bytes */10");
    }
}

#[tokio::test]
async fn test_non_byte_range_unit_is_ignored() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let response = client
        .get("/files/shop/1/profile")
        .add_header("Range", "items=0-1")
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), CONTENT);
}

#[tokio::test]
async fn test_missing_media_is_not_found() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .get("/files/shop/42/profile")
        .add_header("Range", "bytes=0-1")
        .await;
    assert_eq!(response.status_code(), 404);
    assert!(response.maybe_header("content-range").is_none());

    let response = client.get("/files/item/42/media").await;
    assert_eq!(response.status_code(), 404);

    let response = client.get("/files/items/1/nothing-here.mp4").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_serve_by_filename() {
    let app = setup_test_app().await;
    let client = app.client();
    let key = upload_shop_profile(client, 3, CONTENT).await;
    let filename = key.rsplit('/').next().expect("key has a filename");

    let response = client
        .get(&format!("/files/shop-profiles/3/{}", filename))
        .add_header("Range", "bytes=0-3")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), b"0123");

    // Same filename under another shop does not resolve
    let response = client
        .get(&format!("/files/shop-profiles/4/{}", filename))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_delete_profile_removes_object() {
    let app = setup_test_app().await;
    let client = app.client();
    let key = upload_shop_profile(client, 1, CONTENT).await;

    let response = client.delete("/files/shop/1/profile").await;
    assert_eq!(response.status_code(), 204);
    assert!(!app.storage().exists(&key).await);

    let response = client.get("/files/shop/1/profile").await;
    assert_eq!(response.status_code(), 404);

    // Deleting again still succeeds
    let response = client.delete("/files/shop/1/profile").await;
    assert_eq!(response.status_code(), 204);
}

#[tokio::test]
async fn test_cache_and_disposition_headers_by_media_type() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let image = client.get("/files/shop/1/profile").await;
    assert_eq!(image.header("cache-control"), "public, max-age=3600, immutable");
    assert_eq!(
        image.header("content-disposition"),
        "inline; filename=\"shop-profile-1\""
    );

    let response = client
        .post("/files/upload/item-media")
        .multipart(upload_form(
            CONTENT,
            "clip.mp4",
            "video/mp4",
            &[("shopId", "2"), ("itemId", "9")],
        ))
        .await;
    assert_eq!(response.status_code(), 200, "upload failed: {}", response.text());

    let video = client
        .get("/files/item/9/media")
        .add_header("Range", "bytes=0-3")
        .await;
    assert_eq!(video.status_code(), 206);
    assert_eq!(video.header("content-type"), "video/mp4");
    assert_eq!(video.header("cache-control"), "public, max-age=86400, immutable");
    assert_eq!(
        video.header("content-disposition"),
        "inline; filename=\"item-media-9\""
    );

    let strategy = app.storage().current_strategy().await.unwrap();
    strategy
        .put("items/shop-2/notes.txt", bytes::Bytes::from_static(CONTENT), "text/plain")
        .await
        .unwrap();
    let other = client.get("/files/items/2/notes.txt").await;
    assert_eq!(other.status_code(), 200);
    assert_eq!(other.header("cache-control"), "public, max-age=1800");
    assert_eq!(
        other.header("content-disposition"),
        "inline; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_range_is_capped_at_max_chunk() {
    let app = setup_test_app_with(|config| config.storage.stream_max_chunk_bytes = 4).await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let response = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=0-")
        .await;
    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), b"0123");
    assert_eq!(response.header("content-length"), "4");
    assert_eq!(response.header("content-range"), "bytes 0-3/10");

    let response = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=8-")
        .await;
    assert_eq!(response.as_bytes().as_ref(), b"89");
    assert_eq!(response.header("content-range"), "bytes 8-9/10");
}

#[tokio::test]
async fn test_overflowing_range_end_clamps_to_last_byte() {
    let app = setup_test_app().await;
    let client = app.client();
    upload_shop_profile(client, 1, CONTENT).await;

    let response = client
        .get("/files/shop/1/profile")
        .add_header("Range", "bytes=6-99999999999999999999999")
        .await;
    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), b"6789");
    assert_eq!(response.header("content-range"), "bytes 6-9/10");
}
