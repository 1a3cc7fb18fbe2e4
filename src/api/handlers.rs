//! API request handlers

use super::models::{HealthResponse, KeywordsQuery, KeywordsResponse, LoraListResponse};
use super::routes::AppState;
use crate::error::ApiError;
use crate::listing::list_lora_files;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

/// GET /health - Service health check
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// GET /loras - List selectable LoRA files
pub async fn list_loras(
    State(state): State<AppState>,
) -> Result<Json<LoraListResponse>, ApiError> {
    let dir = state.config.lora_dir.clone();
    if !dir.is_dir() {
        return Err(ApiError::NotFound(format!(
            "LoRA directory {:?} not found",
            dir
        )));
    }

    let extensions = state.config.extensions.clone();
    let recursive = state.config.recursive;
    let files = tokio::task::spawn_blocking(move || list_lora_files(&dir, &extensions, recursive))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Listing task failed: {}", e)))??;

    Ok(Json(LoraListResponse { files }))
}

/// GET /keywords?file=... - Resolve keywords for a selected LoRA
///
/// Always 200: lookup failures are reported through `outcome`.
pub async fn resolve_keywords(
    State(state): State<AppState>,
    Query(query): Query<KeywordsQuery>,
) -> Json<KeywordsResponse> {
    let file = query.file.unwrap_or_default();
    let result = state.resolver.resolve(&file).await;

    Json(KeywordsResponse::from_result(file, &result))
}
