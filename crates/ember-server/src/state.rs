//! 应用共享状态

use std::sync::Arc;
use std::time::Duration;

use ember_llm::{Backend, BackendKind, ModelRegistry, ModelRuntime};
use ember_session::SessionStore;

use crate::buildinfo::BuildInfo;
use crate::chat::ChatController;

/// 默认单请求超时
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// 应用状态 - 在 main.rs 中创建并共享给所有 handler
///
/// 后端在启动时确定，之后只读。
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatController,
    pub store: Arc<dyn SessionStore>,
    pub backend: Backend,
    /// 单个对话请求的最长处理时间
    pub request_timeout: Duration,
    pub build: BuildInfo,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(store: Arc<dyn SessionStore>, backend: Backend) -> Self {
        Self {
            chat: ChatController::new(store.clone(), backend.engine.clone()),
            store,
            backend,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            build: BuildInfo::current(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<dyn ModelRegistry> {
        &self.backend.registry
    }

    /// 仅远程后端提供运行时（用于管理接口）
    pub fn runtime(&self) -> Option<&Arc<dyn ModelRuntime>> {
        self.backend.runtime.as_ref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind
    }
}
