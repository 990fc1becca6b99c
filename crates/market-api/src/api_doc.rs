//! OpenAPI documentation served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use market_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market Media API",
        version = "0.1.0",
        description = "Media upload, byte-range streaming and storage strategy administration for shop profile pictures and item media."
    ),
    paths(
        // Uploads
        handlers::file_upload::upload_shop_profile,
        handlers::file_upload::upload_item_media,
        // Delivery
        handlers::media_stream::get_shop_profile,
        handlers::media_stream::get_item_media,
        handlers::media_stream::get_shop_profile_file,
        handlers::media_stream::get_item_file,
        handlers::media_stream::delete_shop_profile,
        handlers::media_stream::delete_item_media,
        // Storage administration
        handlers::storage_admin::get_strategy,
        handlers::storage_admin::switch_strategy,
        handlers::storage_admin::storage_health,
        handlers::storage_admin::migrate,
        handlers::storage_admin::test_strategy,
    ),
    components(schemas(
        models::MediaType,
        error::ErrorResponse,
        handlers::file_upload::UploadResponse,
        handlers::storage_admin::StrategyResponse,
        handlers::storage_admin::SwitchStrategyRequest,
        handlers::storage_admin::SwitchStrategyResponse,
        handlers::storage_admin::MigrateRequest,
        handlers::storage_admin::MigrateResponse,
        handlers::storage_admin::StrategyTestResponse,
    )),
    tags(
        (name = "files", description = "Upload and stream shop and item media"),
        (name = "storage", description = "Storage strategy administration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_streaming_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/files/shop/{shopId}/profile"));
        assert!(spec.paths.paths.contains_key("/api/storage/migrate"));
    }
}
