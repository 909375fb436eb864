//! # Storage Traits
//!
//! 定义会话存储的核心 trait。

use async_trait::async_trait;
use ember_core::Message;

use crate::error::StorageResult;
use crate::types::SessionSummary;

/// 会话存储 trait
///
/// 每个会话是一个只追加的消息序列。实现必须保证并发追加不丢失、不重排，
/// 并且读取返回一致的快照副本。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 追加消息到会话（会话不存在时隐式创建）
    ///
    /// 空会话 ID 返回 `StorageError::InvalidArgument`。
    async fn append(&self, session_id: &str, message: Message) -> StorageResult<()>;

    /// 获取会话的全部消息（按插入顺序的副本）
    ///
    /// 未知会话返回空列表而不是错误。
    async fn get(&self, session_id: &str) -> StorageResult<Vec<Message>>;

    /// 注册一个空会话，或刷新已有会话的最后更新时间
    async fn touch(&self, session_id: &str) -> StorageResult<()>;

    /// 列出会话摘要（可选能力）
    ///
    /// 返回 `None` 表示该实现不提供摘要，调用方应当视为“没有摘要”。
    async fn summaries(&self) -> Option<Vec<SessionSummary>> {
        None
    }
}
