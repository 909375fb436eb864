//! 管理接口，仅在远程后端启用时注册

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub name: String,
}

/// POST /admin/models/pull
pub async fn pull_model(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PullRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("invalid json"))?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let runtime = state
        .runtime()
        .ok_or_else(|| ApiError::internal("model runtime not available"))?;

    info!("pulling model {}", name);
    runtime.pull(name).await.map_err(|e| {
        warn!("pull of {} failed: {}", name, e);
        ApiError::from_runtime(e)
    })?;
    info!("model {} pulled", name);

    Ok(Json(json!({ "ok": true })))
}
