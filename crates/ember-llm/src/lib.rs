//! Model runtime access for the gateway: the Ollama HTTP client, generation
//! engines, model registries and the startup backend selection.

pub mod backend;
pub mod client;
pub mod engine;
pub mod error;
pub mod readiness;
pub mod registry;
pub mod runtime;

// Re-export core types
pub use backend::{select_backend, Backend, BackendConfig, BackendKind};
pub use client::{ClientConfig, OllamaClient};
pub use engine::{EchoEngine, GenerationEngine, RemoteEngine};
pub use error::{LLMError, Result};
pub use readiness::{check_ready, wait_for_runtime, ReadinessConfig, ReadinessError};
pub use registry::{ModelRegistry, RemoteRegistry, StaticRegistry};
pub use runtime::{Generation, ModelRuntime, ModelTag};
