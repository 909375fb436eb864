//! `/api` 下的对话、历史、模型与会话接口

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, SecondsFormat, Utc};
use ember_core::Role;
use ember_session::{normalize_session_id, SessionSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, Instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// 发送消息请求
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// 发送消息响应
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub latency_ms: u64,
    pub model: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct SessionListEntry {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionSummary> for SessionListEntry {
    fn from(summary: SessionSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            updated_at: summary.updated_at,
        }
    }
}

/// 为单个请求创建取消令牌
///
/// 返回的 guard 被丢弃时（请求完成或客户端断开）令牌被取消；
/// 超过 `timeout` 后令牌同样被取消。
pub fn request_token(timeout: Duration) -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let deadline = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                debug!("request deadline of {:?} reached", timeout);
                deadline.cancel();
            }
            _ = deadline.cancelled() => {}
        }
    });
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        debug!("rejected chat body: {}", e);
        ApiError::bad_request("invalid json")
    })?;
    let session_id = normalize_session_id(req.session_id.as_deref());

    let span = tracing::info_span!("chat", session_id = %session_id, model = %req.model);
    async move {
        let (cancel, _guard) = request_token(state.request_timeout);
        let reply = state
            .chat
            .chat(&session_id, &req.model, &req.message, &cancel)
            .await?;

        info!("chat turn completed in {:?}", reply.latency);
        Ok::<_, ApiError>(Json(ChatResponse {
            response: reply.message.content,
            timestamp: reply
                .message
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            latency_ms: reply.latency.as_millis() as u64,
            model: req.model,
            session_id,
        }))
    }
    .instrument(span)
    .await
}

/// GET /api/history/:session_id
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let messages = state.store.get(&session_id).await?;
    let history = messages
        .into_iter()
        .map(|m| HistoryEntry {
            role: m.role,
            content: m.content,
        })
        .collect();
    Ok(Json(HistoryResponse { history }))
}

/// GET /api/models
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let models = state
        .registry()
        .list()
        .await
        .map_err(ApiError::from_runtime)?;
    Ok(Json(json!({ "models": models })))
}

/// GET /api/models/:name/health
pub async fn model_health(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .registry()
        .health_check(&name)
        .await
        .map_err(ApiError::from_runtime)?;
    Ok(Json(json!({ "model": name, "healthy": true })))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = uuid::Uuid::new_v4().to_string();
    state.store.touch(&session_id).await?;
    info!("created session {}", session_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "session_id": session_id })),
    ))
}

/// GET /api/sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions: Vec<SessionListEntry> = state
        .store
        .summaries()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(SessionListEntry::from)
        .collect();
    Json(json!({ "sessions": sessions }))
}
