//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use market_storage::DiskUsage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub current_strategy: String,
    pub storage: &'static str,
    /// "ok", "low" above the configured usage threshold, or "unknown" without disk data
    pub disk_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskUsage>,
}

/// Liveness check - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Healthy when the active storage strategy answers in time and, for
/// disk-backed strategies, the upload disk is below the usage threshold.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let current_strategy = state.storage.current_strategy_name().await;

    let storage = match tokio::time::timeout(TIMEOUT, state.storage.is_available()).await {
        Ok(true) => "healthy",
        Ok(false) => "unavailable",
        Err(_) => "timeout",
    };

    let threshold = state.config.storage().disk_usage_threshold_percent;
    let disk = tokio::time::timeout(TIMEOUT, state.storage.disk_usage())
        .await
        .ok()
        .flatten();
    let disk_status = match &disk {
        Some(usage) if usage.exceeds(threshold) => "low",
        Some(_) => "ok",
        None => "unknown",
    };

    let (status_code, status) = if storage == "healthy" && disk_status != "low" {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!(
            current_strategy = %current_strategy,
            storage = storage,
            disk_status = disk_status,
            usage_percent = disk.as_ref().map(|d| d.usage_percent),
            threshold_percent = threshold,
            "Health check failed"
        );
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status,
            current_strategy,
            storage,
            disk_status,
            disk,
        }),
    )
}
