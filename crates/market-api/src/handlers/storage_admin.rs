//! Storage strategy administration: inspect, switch, migrate and self-test.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use market_core::AppError;
use market_storage::HealthStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResponse {
    pub current_strategy: String,
    pub available_strategies: BTreeMap<String, bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchStrategyRequest {
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchStrategyResponse {
    pub message: String,
    pub current_strategy: String,
    pub available_strategies: BTreeMap<String, bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRequest {
    pub from_strategy: Option<String>,
    pub to_strategy: Option<String>,
    #[serde(default)]
    pub storage_identifiers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub message: String,
    pub migrated_files: usize,
    pub migration_map: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct TestQuery {
    /// Optional key to report streaming hints for
    pub key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyTestResponse {
    pub current_strategy: String,
    pub is_available: bool,
    pub test_status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_streaming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_chunk_size: Option<u64>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("'{}' is required", field)))
}

/// Current strategy and the availability of every registered strategy
#[utoipa::path(
    get,
    path = "/api/storage/strategy",
    tag = "storage",
    responses((status = 200, description = "Strategy overview", body = StrategyResponse))
)]
pub async fn get_strategy(State(state): State<Arc<AppState>>) -> Json<StrategyResponse> {
    Json(StrategyResponse {
        current_strategy: state.storage.current_strategy_name().await,
        available_strategies: state.storage.available_strategies().await,
    })
}

/// Switch the active strategy
#[utoipa::path(
    post,
    path = "/api/storage/strategy",
    tag = "storage",
    request_body = SwitchStrategyRequest,
    responses(
        (status = 200, description = "Switched", body = SwitchStrategyResponse),
        (status = 400, description = "Missing or unknown strategy", body = ErrorResponse),
        (status = 503, description = "Strategy unavailable", body = ErrorResponse)
    )
)]
pub async fn switch_strategy(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SwitchStrategyRequest>,
) -> Result<Json<SwitchStrategyResponse>, HttpAppError> {
    let name = required(request.strategy, "strategy")?;

    state.storage.set_strategy(&name).await?;

    Ok(Json(SwitchStrategyResponse {
        message: format!("Storage strategy switched to {}", name),
        current_strategy: state.storage.current_strategy_name().await,
        available_strategies: state.storage.available_strategies().await,
    }))
}

/// Strategy health snapshot
#[utoipa::path(
    get,
    path = "/api/storage/health",
    tag = "storage",
    responses((status = 200, description = "Health of every registered strategy"))
)]
pub async fn storage_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.storage.health_status().await)
}

/// Copy stored objects from one strategy to another under the same keys
#[utoipa::path(
    post,
    path = "/api/storage/migrate",
    tag = "storage",
    request_body = MigrateRequest,
    responses(
        (status = 200, description = "All keys migrated", body = MigrateResponse),
        (status = 400, description = "Missing or unknown strategy", body = ErrorResponse),
        (status = 500, description = "A key failed to migrate", body = ErrorResponse),
        (status = 503, description = "Strategy unavailable", body = ErrorResponse)
    )
)]
pub async fn migrate(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<MigrateRequest>,
) -> Result<Json<MigrateResponse>, HttpAppError> {
    let from = required(request.from_strategy, "fromStrategy")?;
    let to = required(request.to_strategy, "toStrategy")?;

    let migration_map = state
        .storage
        .migrate(&from, &to, &request.storage_identifiers)
        .await?;

    Ok(Json(MigrateResponse {
        message: format!("Migrated {} file(s) from {} to {}", migration_map.len(), from, to),
        migrated_files: migration_map.len(),
        migration_map,
    }))
}

/// Check that the active strategy is usable
#[utoipa::path(
    post,
    path = "/api/storage/test",
    tag = "storage",
    params(("key" = Option<String>, Query, description = "Stored key to report streaming hints for")),
    responses((status = 200, description = "Self-test result", body = StrategyTestResponse))
)]
pub async fn test_strategy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TestQuery>,
) -> Json<StrategyTestResponse> {
    let current_strategy = state.storage.current_strategy_name().await;
    let is_available = state.storage.is_available().await;

    let (test_status, message) = if is_available {
        ("PASSED", format!("Storage strategy {} is working", current_strategy))
    } else {
        ("FAILED", format!("Storage strategy {} is not available", current_strategy))
    };

    let mut response = StrategyTestResponse {
        current_strategy,
        is_available,
        test_status: test_status.to_string(),
        message,
        key: None,
        key_exists: None,
        supports_streaming: None,
        optimal_chunk_size: None,
    };

    if let Some(key) = query.key.filter(|k| !k.trim().is_empty()) {
        response.key_exists = Some(state.storage.exists(&key).await);
        response.supports_streaming = state.storage.supports_streaming(&key).await.ok();
        response.optimal_chunk_size = state.storage.optimal_chunk_size(&key).await.ok();
        response.key = Some(key);
    }

    Json(response)
}
