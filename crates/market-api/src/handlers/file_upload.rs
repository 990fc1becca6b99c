//! Upload handlers for shop profile pictures and item media.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use market_core::{MediaType, UploadTarget};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub storage_key: String,
    pub media_type: MediaType,
    pub message: String,
}

/// Upload a shop profile picture (images only).
///
/// Replaces any previous profile picture of the shop; the old object is
/// deleted best-effort after the new one is stored.
#[utoipa::path(
    post,
    path = "/files/upload/shop-profile",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Fields: `file`, `shopId`"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Rejected by upload policy", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_shop_profile(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let form = extract_upload_form(multipart).await?;
    let shop_id = form.owner_id("shopId")?;

    let stored = state
        .storage
        .store(form.file, UploadTarget::ShopProfile { shop_id })
        .await?;

    let previous = state
        .registry
        .record_shop_profile(shop_id, stored.key.clone())
        .await;
    cleanup_replaced(&state, previous, &stored.key).await;

    tracing::info!(
        shop_id = shop_id,
        key = %stored.key,
        size_bytes = stored.size_bytes,
        "Shop profile picture uploaded"
    );

    Ok(Json(UploadResponse {
        storage_key: stored.key,
        media_type: stored.media_type,
        message: "Shop profile picture uploaded successfully".to_string(),
    }))
}

/// Upload an image or video for an item.
#[utoipa::path(
    post,
    path = "/files/upload/item-media",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Fields: `file`, `shopId`, `itemId`"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Rejected by upload policy", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_item_media(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let form = extract_upload_form(multipart).await?;
    let shop_id = form.owner_id("shopId")?;
    let item_id = form.owner_id("itemId")?;

    let stored = state
        .storage
        .store(form.file, UploadTarget::ItemMedia { shop_id, item_id })
        .await?;

    let previous = state
        .registry
        .record_item_media(item_id, shop_id, stored.key.clone())
        .await;
    cleanup_replaced(&state, previous, &stored.key).await;

    tracing::info!(
        shop_id = shop_id,
        item_id = item_id,
        key = %stored.key,
        media_type = %stored.media_type,
        size_bytes = stored.size_bytes,
        "Item media uploaded"
    );

    Ok(Json(UploadResponse {
        storage_key: stored.key,
        media_type: stored.media_type,
        message: "Item media uploaded successfully".to_string(),
    }))
}

async fn cleanup_replaced(state: &AppState, previous: Option<String>, current: &str) {
    if let Some(old_key) = previous.filter(|k| k != current) {
        delete_best_effort(state, &old_key).await;
    }
}

/// Delete a stored object, logging instead of failing.
pub(crate) async fn delete_best_effort(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete(key).await {
        tracing::warn!(key = %key, error = %e, "Failed to delete replaced media");
    }
}
