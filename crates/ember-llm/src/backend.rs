use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::{EchoEngine, GenerationEngine, RemoteEngine};
use crate::readiness::{wait_for_runtime, ReadinessConfig};
use crate::registry::{ModelRegistry, RemoteRegistry, StaticRegistry};
use crate::runtime::ModelRuntime;

/// Startup inputs for [`select_backend`]
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Wait for the runtime first. `None` skips the wait.
    pub readiness: Option<ReadinessConfig>,
    /// Models reported by the static registry in echo mode
    pub fallback_models: Vec<String>,
    /// Minimum latency of the echo engine
    pub echo_latency: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Echo,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Echo => "echo",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine and registry chosen at startup. Fixed for the process lifetime.
#[derive(Clone)]
pub struct Backend {
    pub kind: BackendKind,
    pub engine: Arc<dyn GenerationEngine>,
    pub registry: Arc<dyn ModelRegistry>,
    /// Set only for the remote backend; gates the admin surface
    pub runtime: Option<Arc<dyn ModelRuntime>>,
}

impl Backend {
    /// Offline backend over a static model list
    pub fn echo(fallback_models: &[String], echo_latency: Duration) -> Self {
        Self {
            kind: BackendKind::Echo,
            engine: Arc::new(EchoEngine::new(echo_latency)),
            registry: Arc::new(StaticRegistry::new(fallback_models.iter().cloned())),
            runtime: None,
        }
    }

    /// Backend that forwards everything to `runtime`
    pub fn remote(runtime: Arc<dyn ModelRuntime>) -> Self {
        Self {
            kind: BackendKind::Remote,
            engine: Arc::new(RemoteEngine::new(runtime.clone())),
            registry: Arc::new(RemoteRegistry::new(runtime.clone())),
            runtime: Some(runtime),
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("engine", &self.engine.name())
            .finish()
    }
}

/// Pick the generation backend.
///
/// The readiness wait only warms things up and is logged; the final ping
/// alone decides between remote and echo.
pub async fn select_backend(runtime: Arc<dyn ModelRuntime>, config: &BackendConfig) -> Backend {
    if let Some(readiness) = &config.readiness {
        info!(
            "waiting for runtime (timeout {:?}, interval {:?}, models {:?})",
            readiness.timeout, readiness.interval, readiness.required_models
        );
        match wait_for_runtime(runtime.as_ref(), readiness).await {
            Ok(()) => info!("runtime readiness check passed"),
            Err(e) => warn!("runtime readiness check failed: {}", e),
        }
    }

    match runtime.ping().await {
        Ok(()) => {
            info!("runtime reachable, using remote backend");
            Backend::remote(runtime)
        }
        Err(e) => {
            warn!("runtime unreachable ({}), falling back to echo backend", e);
            Backend::echo(&config.fallback_models, config.echo_latency)
        }
    }
}
