//! # Memory Storage
//!
//! 进程内会话存储。会话只在进程生命周期内存在，不做持久化。
//!
//! 锁策略：
//! - 外层 `DashMap` 只负责按 ID 找到会话条目；
//! - 每个会话有独立的 `RwLock`，读取共享、追加独占；
//! - 不跨越 `.await` 持有任何锁。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ember_core::Message;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::storage::SessionStore;
use crate::types::{derive_title, SessionSummary};

/// 内存中的会话条目
#[derive(Debug)]
struct SessionEntry {
    /// 按插入顺序排列的消息
    messages: Vec<Message>,
    /// 最后一次追加或 touch 的时间
    updated_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }
}

/// 内存会话存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashMap<String, RwLock<SessionEntry>>,
}

impl MemoryStore {
    /// 创建空的存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已知的会话数
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn ensure_id(session_id: &str) -> StorageResult<()> {
        if session_id.is_empty() {
            return Err(StorageError::empty_session_id());
        }
        Ok(())
    }

    /// 对会话条目执行写操作，必要时先创建条目
    fn with_entry_mut<F>(&self, session_id: &str, f: F)
    where
        F: FnOnce(&mut SessionEntry),
    {
        if let Some(entry) = self.sessions.get(session_id) {
            f(&mut entry.write());
            return;
        }

        // 并发的首次写入只有一个会真正插入，其余拿到同一个条目
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Creating session: {}", session_id);
                RwLock::new(SessionEntry::new())
            })
            .downgrade();
        f(&mut entry.write());
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn append(&self, session_id: &str, message: Message) -> StorageResult<()> {
        Self::ensure_id(session_id)?;
        self.with_entry_mut(session_id, |entry| entry.push(message));
        Ok(())
    }

    async fn get(&self, session_id: &str) -> StorageResult<Vec<Message>> {
        Self::ensure_id(session_id)?;
        Ok(self
            .sessions
            .get(session_id)
            .map(|entry| entry.read().messages.clone())
            .unwrap_or_default())
    }

    async fn touch(&self, session_id: &str) -> StorageResult<()> {
        Self::ensure_id(session_id)?;
        self.with_entry_mut(session_id, |entry| entry.updated_at = Utc::now());
        Ok(())
    }

    async fn summaries(&self) -> Option<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .iter()
            .map(|entry| {
                let session = entry.value().read();
                SessionSummary {
                    id: entry.key().clone(),
                    title: derive_title(&session.messages),
                    updated_at: session.updated_at,
                }
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Some(summaries)
    }
}
