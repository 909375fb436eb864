use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ember_llm::LLMError;
use ember_session::StorageError;
use serde_json::json;

use crate::chat::ChatError;

/// HTTP 错误响应，序列化为 `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 模型管理类调用（健康检查、拉取）的运行时错误映射，上游失败为 502
    pub fn from_runtime(err: LLMError) -> Self {
        let status = match &err {
            LLMError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            LLMError::UnknownModel(_) => StatusCode::NOT_FOUND,
            LLMError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidArgument { .. } => Self::bad_request(err.to_string()),
            StorageError::Other { .. } => Self::internal(err.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let status = match &err {
            ChatError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ChatError::Engine(LLMError::Cancelled) => StatusCode::GATEWAY_TIMEOUT,
            ChatError::Engine(LLMError::UnknownModel(_)) => StatusCode::NOT_FOUND,
            ChatError::Engine(_) | ChatError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
