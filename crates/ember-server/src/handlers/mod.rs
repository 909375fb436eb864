//! HTTP 处理器

pub mod admin;
pub mod api;

use std::sync::Arc;

use axum::{extract::State, response::Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::buildinfo::BuildInfo;
use crate::state::AppState;

/// 存活检查
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": true,
        "message": "ember-gateway",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// 构建版本信息
pub async fn version(State(state): State<Arc<AppState>>) -> Json<BuildInfo> {
    Json(state.build)
}
