//! 对话编排：记录用户消息 → 调用生成引擎 → 记录助手回复

use std::sync::Arc;
use std::time::Duration;

use ember_core::Message;
use ember_llm::{GenerationEngine, LLMError};
use ember_session::{normalize_session_id, SessionStore, StorageError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("session error: {0}")]
    Session(#[from] StorageError),

    #[error("generation failed: {0}")]
    Engine(#[from] LLMError),
}

/// 一轮对话的结果
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// 已写入会话的助手消息
    pub message: Message,
    /// 引擎耗时
    pub latency: Duration,
}

/// 对话控制器
#[derive(Clone)]
pub struct ChatController {
    store: Arc<dyn SessionStore>,
    engine: Arc<dyn GenerationEngine>,
}

impl ChatController {
    pub fn new(store: Arc<dyn SessionStore>, engine: Arc<dyn GenerationEngine>) -> Self {
        Self { store, engine }
    }

    /// 处理一轮对话
    ///
    /// 生成失败时用户消息保留，不写入助手消息，也不重试。
    pub async fn chat(
        &self,
        session_id: &str,
        model: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, ChatError> {
        if model.is_empty() || prompt.is_empty() {
            return Err(ChatError::InvalidArgument(
                "model and message are required".to_string(),
            ));
        }
        let session_id = normalize_session_id(Some(session_id));

        self.store.append(&session_id, Message::user(prompt)).await?;

        let generation = match self.engine.generate(model, prompt, cancel).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!(
                    "engine {} failed for session {}: {}",
                    self.engine.name(),
                    session_id,
                    e
                );
                return Err(e.into());
            }
        };
        debug!(
            "engine {} answered in {:?}",
            self.engine.name(),
            generation.elapsed
        );

        let reply = Message::assistant(generation.text);
        self.store.append(&session_id, reply.clone()).await?;

        Ok(ChatReply {
            message: reply,
            latency: generation.elapsed,
        })
    }
}
