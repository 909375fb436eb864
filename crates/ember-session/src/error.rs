//! # Storage Error Types
//!
//! 定义会话存储相关的错误类型。

use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// 参数非法（例如空的会话 ID）
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// 其他错误
    #[error("Storage error: {message}")]
    Other { message: String },
}

impl StorageError {
    /// 创建参数错误
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// 创建其他错误
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// 空会话 ID 错误
    pub fn empty_session_id() -> Self {
        Self::invalid_argument("empty session id")
    }
}

/// 存储结果类型
pub type StorageResult<T> = Result<T, StorageError>;
