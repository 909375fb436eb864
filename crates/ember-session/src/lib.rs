//! # Ember Session Storage
//!
//! 会话记录的并发存储。
//!
//! ## 功能特性
//!
//! - **只追加的消息序列**：插入顺序即对话顺序，从不重排或删除
//! - **读写锁**：不同会话的读取互不阻塞，追加只在修改期间独占
//! - **会话摘要**：可选能力，用于会话列表展示
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use ember_core::Message;
//! use ember_session::{MemoryStore, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     store.append("default", Message::user("Hello!")).await?;
//!     let history = store.get("default").await?;
//!     assert_eq!(history.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory_storage;
pub mod storage;
pub mod types;

// 重新导出主要类型
pub use error::{StorageError, StorageResult};
pub use memory_storage::MemoryStore;
pub use storage::SessionStore;
pub use types::{derive_title, SessionSummary};

/// 未指定会话时使用的会话 ID
pub const DEFAULT_SESSION_ID: &str = "default";

/// 空白会话 ID 归一化为 [`DEFAULT_SESSION_ID`]
pub fn normalize_session_id(session_id: Option<&str>) -> String {
    match session_id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => DEFAULT_SESSION_ID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_session_id() {
        assert_eq!(normalize_session_id(None), "default");
        assert_eq!(normalize_session_id(Some("")), "default");
        assert_eq!(normalize_session_id(Some("   ")), "default");
        assert_eq!(normalize_session_id(Some("s1")), "s1");
    }
}
