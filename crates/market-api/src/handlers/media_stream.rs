//! Media delivery with HTTP byte-range support.
//!
//! Every GET resolves a storage key and hands it to [`stream_media`], which
//! answers 200 (full body), 206 (one satisfiable range), 404 or 416.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use market_core::{AppError, OwnerId};
use market_storage::media_types::{cache_control_for, content_type_for_key};
use market_storage::{parse_range_header, ByteRange, Namespace, StorageError, StorageStrategy};

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::file_upload::delete_best_effort;
use crate::state::AppState;

/// Serve `key` from `strategy`, honoring a single `Range: bytes=` request.
///
/// The caller resolves the strategy once so every step of the request reads
/// from the same backend.
pub async fn stream_media(
    strategy: &dyn StorageStrategy,
    key: &str,
    display_name: &str,
    range: Option<&HeaderValue>,
    max_chunk: u64,
) -> Result<Response, HttpAppError> {
    if !strategy.exists(key).await {
        return Err(AppError::NotFound("Media not found".to_string()).into());
    }

    let total = strategy.size(key).await?;
    let content_type = content_type_for_key(key);
    let disposition = format!("inline; filename=\"{}\"", display_name.replace('"', ""));

    let requested = match range {
        None => None,
        Some(value) => {
            let Ok(value) = value.to_str() else {
                return Ok(range_not_satisfiable(key, total));
            };
            match parse_range_header(value, total, max_chunk) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!(key = %key, range = %value, total = total, error = %e, "Rejected range request");
                    return Ok(range_not_satisfiable(key, total));
                }
            }
        }
    };

    match requested {
        None => full_response(strategy, key, total, content_type, &disposition).await,
        Some(range) => {
            partial_response(strategy, key, range, total, content_type, &disposition).await
        }
    }
}

async fn full_response(
    strategy: &dyn StorageStrategy,
    key: &str,
    total: u64,
    content_type: &'static str,
    disposition: &str,
) -> Result<Response, HttpAppError> {
    let stream = strategy.open(key).await?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    tracing::debug!(key = %key, strategy = strategy.name(), size_bytes = total, "Serving full media");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, total)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, cache_control_for(content_type))
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}

async fn partial_response(
    strategy: &dyn StorageStrategy,
    key: &str,
    range: ByteRange,
    total: u64,
    content_type: &'static str,
    disposition: &str,
) -> Result<Response, HttpAppError> {
    let chunk = match strategy.read_chunk(key, range.start, range.end).await {
        Ok(chunk) => chunk,
        Err(StorageError::InvalidRange { size, .. }) => {
            return Ok(range_not_satisfiable(key, size));
        }
        Err(e) => return Err(e.into()),
    };

    if chunk.is_empty() {
        return Ok(range_not_satisfiable(key, total));
    }
    // A short read shrinks the served range rather than padding it.
    let served = ByteRange {
        start: range.start,
        end: range.start + chunk.len() as u64 - 1,
    };
    tracing::debug!(
        key = %key,
        strategy = strategy.name(),
        start = served.start,
        end = served.end,
        total = total,
        "Serving partial media"
    );

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, chunk.len())
        .header(header::CONTENT_RANGE, served.content_range(total))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, cache_control_for(content_type))
        .body(Body::from(chunk))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}

fn range_not_satisfiable(key: &str, total: u64) -> Response {
    let error = AppError::RangeNotSatisfiable(format!(
        "Requested range is not satisfiable for {} ({} bytes)",
        key, total
    ));
    let mut response = HttpAppError(error).into_response();
    if let Ok(value) = HeaderValue::from_str(&ByteRange::unsatisfied_content_range(total)) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    response.headers_mut().insert(
        header::ACCEPT_RANGES,
        HeaderValue::from_static("bytes"),
    );
    response
}

fn not_found(message: &str) -> HttpAppError {
    AppError::NotFound(message.to_string()).into()
}

/// Stream a shop's profile picture
#[utoipa::path(
    get,
    path = "/files/shop/{shopId}/profile",
    tag = "files",
    params(
        ("shopId" = i64, Path, description = "Shop ID"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. `bytes=0-1023`")
    ),
    responses(
        (status = 200, description = "Full file"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "No profile picture", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse)
    )
)]
pub async fn get_shop_profile(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<OwnerId>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let key = state
        .registry
        .shop_profile(shop_id)
        .await
        .ok_or_else(|| not_found("Shop profile picture not found"))?;

    let strategy = state.storage.current_strategy().await?;
    stream_media(
        strategy.as_ref(),
        &key,
        &format!("shop-profile-{}", shop_id),
        headers.get(header::RANGE),
        state.config.stream_max_chunk_bytes(),
    )
    .await
}

/// Stream an item's media
#[utoipa::path(
    get,
    path = "/files/item/{itemId}/media",
    tag = "files",
    params(
        ("itemId" = i64, Path, description = "Item ID"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. `bytes=0-1023`")
    ),
    responses(
        (status = 200, description = "Full file"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "No media for item", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse)
    )
)]
pub async fn get_item_media(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<OwnerId>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let record = state
        .registry
        .item_media(item_id)
        .await
        .ok_or_else(|| not_found("Item media not found"))?;

    let strategy = state.storage.current_strategy().await?;
    stream_media(
        strategy.as_ref(),
        &record.key,
        &format!("item-media-{}", item_id),
        headers.get(header::RANGE),
        state.config.stream_max_chunk_bytes(),
    )
    .await
}

/// Stream a shop profile file by name
#[utoipa::path(
    get,
    path = "/files/shop-profiles/{shopId}/{filename}",
    tag = "files",
    params(
        ("shopId" = i64, Path, description = "Shop ID"),
        ("filename" = String, Path, description = "Stored file name"),
        ("Range" = Option<String>, Header, description = "Single byte range")
    ),
    responses(
        (status = 200, description = "Full file"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse)
    )
)]
pub async fn get_shop_profile_file(
    State(state): State<Arc<AppState>>,
    Path((shop_id, filename)): Path<(OwnerId, String)>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    serve_by_filename(&state, Namespace::ShopProfiles, shop_id, &filename, &headers).await
}

/// Stream an item media file by name
#[utoipa::path(
    get,
    path = "/files/items/{shopId}/{filename}",
    tag = "files",
    params(
        ("shopId" = i64, Path, description = "Shop ID"),
        ("filename" = String, Path, description = "Stored file name"),
        ("Range" = Option<String>, Header, description = "Single byte range")
    ),
    responses(
        (status = 200, description = "Full file"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse)
    )
)]
pub async fn get_item_file(
    State(state): State<Arc<AppState>>,
    Path((shop_id, filename)): Path<(OwnerId, String)>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    serve_by_filename(&state, Namespace::Items, shop_id, &filename, &headers).await
}

async fn serve_by_filename(
    state: &AppState,
    namespace: Namespace,
    shop_id: OwnerId,
    filename: &str,
    headers: &HeaderMap,
) -> Result<Response, HttpAppError> {
    let strategy = state.storage.current_strategy().await?;
    let key = strategy.layout().relative(namespace, shop_id, filename)?;

    stream_media(
        strategy.as_ref(),
        &key,
        filename,
        headers.get(header::RANGE),
        state.config.stream_max_chunk_bytes(),
    )
    .await
}

/// Remove a shop's profile picture. Always succeeds.
#[utoipa::path(
    delete,
    path = "/files/shop/{shopId}/profile",
    tag = "files",
    params(("shopId" = i64, Path, description = "Shop ID")),
    responses((status = 204, description = "Removed (or nothing to remove)"))
)]
pub async fn delete_shop_profile(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<OwnerId>,
) -> impl IntoResponse {
    if let Some(key) = state.registry.remove_shop_profile(shop_id).await {
        delete_best_effort(&state, &key).await;
        tracing::info!(shop_id = shop_id, key = %key, "Shop profile picture removed");
    }
    StatusCode::NO_CONTENT
}

/// Remove an item's media. Always succeeds.
#[utoipa::path(
    delete,
    path = "/files/item/{itemId}/media",
    tag = "files",
    params(("itemId" = i64, Path, description = "Item ID")),
    responses((status = 204, description = "Removed (or nothing to remove)"))
)]
pub async fn delete_item_media(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<OwnerId>,
) -> impl IntoResponse {
    if let Some(key) = state.registry.remove_item_media(item_id).await {
        delete_best_effort(&state, &key).await;
        tracing::info!(item_id = item_id, key = %key, "Item media removed");
    }
    StatusCode::NO_CONTENT
}
