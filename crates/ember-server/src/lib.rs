//! Ember HTTP 网关
//!
//! 将对话请求转发到 Ollama 运行时；运行时不可达时回退到 echo 引擎。

pub mod buildinfo;
pub mod chat;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;

pub use buildinfo::BuildInfo;
pub use chat::{ChatController, ChatError, ChatReply};
pub use cli::Cli;
pub use error::ApiError;
pub use server::{create_router, run_server, ServerOptions};
pub use state::AppState;
