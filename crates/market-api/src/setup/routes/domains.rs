//! Domain route groups (file delivery, storage administration).

use crate::constants::{FILES_PREFIX, STORAGE_API_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn file_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/upload/shop-profile", FILES_PREFIX),
            post(handlers::file_upload::upload_shop_profile),
        )
        .route(
            &format!("{}/upload/item-media", FILES_PREFIX),
            post(handlers::file_upload::upload_item_media),
        )
        .route(
            &format!("{}/shop/{{shop_id}}/profile", FILES_PREFIX),
            get(handlers::media_stream::get_shop_profile)
                .delete(handlers::media_stream::delete_shop_profile),
        )
        .route(
            &format!("{}/item/{{item_id}}/media", FILES_PREFIX),
            get(handlers::media_stream::get_item_media)
                .delete(handlers::media_stream::delete_item_media),
        )
        .route(
            &format!("{}/shop-profiles/{{shop_id}}/{{filename}}", FILES_PREFIX),
            get(handlers::media_stream::get_shop_profile_file),
        )
        .route(
            &format!("{}/items/{{shop_id}}/{{filename}}", FILES_PREFIX),
            get(handlers::media_stream::get_item_file),
        )
        .with_state(state)
}

pub fn storage_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/strategy", STORAGE_API_PREFIX),
            get(handlers::storage_admin::get_strategy).post(handlers::storage_admin::switch_strategy),
        )
        .route(
            &format!("{}/health", STORAGE_API_PREFIX),
            get(handlers::storage_admin::storage_health),
        )
        .route(
            &format!("{}/migrate", STORAGE_API_PREFIX),
            post(handlers::storage_admin::migrate),
        )
        .route(
            &format!("{}/test", STORAGE_API_PREFIX),
            post(handlers::storage_admin::test_strategy),
        )
        .with_state(state)
}
