use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{LLMError, Result};
use crate::runtime::{Generation, ModelRuntime};

/// Turns a (model, prompt) pair into generated text
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Engine identifier, used in logs
    fn name(&self) -> &str;

    /// Generate a reply. Implementations that do I/O must stop and return
    /// `LLMError::Cancelled` once `cancel` fires.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Generation>;
}

/// Offline engine that echoes the prompt back
#[derive(Debug, Clone)]
pub struct EchoEngine {
    min_latency: Duration,
}

impl EchoEngine {
    pub fn new(min_latency: Duration) -> Self {
        Self { min_latency }
    }

    /// The canned reply for a prompt
    pub fn reply(model: &str, prompt: &str) -> String {
        format!("(demo:{}) you said: {}", model, prompt)
    }
}

#[async_trait]
impl GenerationEngine for EchoEngine {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        _cancel: &CancellationToken,
    ) -> Result<Generation> {
        let start = Instant::now();
        if !self.min_latency.is_zero() {
            tokio::time::sleep(self.min_latency).await;
        }
        Ok(Generation {
            text: Self::reply(model, prompt),
            elapsed: start.elapsed(),
        })
    }
}

/// Engine backed by the remote model runtime
#[derive(Clone)]
pub struct RemoteEngine {
    runtime: Arc<dyn ModelRuntime>,
}

impl RemoteEngine {
    pub fn new(runtime: Arc<dyn ModelRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl GenerationEngine for RemoteEngine {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Generation> {
        tokio::select! {
            // Dropping the runtime future aborts the in-flight HTTP request
            _ = cancel.cancelled() => {
                debug!("generation for model {} cancelled", model);
                Err(LLMError::Cancelled)
            }
            result = self.runtime.generate(model, prompt) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ModelTag;

    struct SlowRuntime {
        delay: Duration,
        reply: std::result::Result<String, LLMError>,
    }

    #[async_trait]
    impl ModelRuntime for SlowRuntime {
        async fn ping(&self) -> Result<()> {
            Ok(())
        }

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<Generation> {
            let start = Instant::now();
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map(|text| Generation {
                text,
                elapsed: start.elapsed(),
            })
        }

        async fn list_tags(&self) -> Result<Vec<ModelTag>> {
            Ok(vec![])
        }

        async fn pull(&self, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_echo_embeds_model_and_prompt() {
        let engine = EchoEngine::new(Duration::from_millis(20));
        let out = engine
            .generate("demo-model", "hello", &CancellationToken::new())
            .await
            .unwrap();

        assert!(out.text.contains("demo-model"));
        assert!(out.text.contains("hello"));
        assert!(out.elapsed >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_echo_zero_latency() {
        let engine = EchoEngine::new(Duration::ZERO);
        let out = engine
            .generate("m", "p", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.text, "(demo:m) you said: p");
    }

    #[tokio::test]
    async fn test_remote_delegates_to_runtime() {
        let engine = RemoteEngine::new(Arc::new(SlowRuntime {
            delay: Duration::from_millis(10),
            reply: Ok("from runtime".to_string()),
        }));

        let out = engine
            .generate("m", "p", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.text, "from runtime");
        assert!(out.elapsed >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_remote_propagates_failure() {
        let engine = RemoteEngine::new(Arc::new(SlowRuntime {
            delay: Duration::ZERO,
            reply: Err(LLMError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        }));

        let err = engine
            .generate("m", "p", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::Api { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_cancellation() {
        let engine = RemoteEngine::new(Arc::new(SlowRuntime {
            delay: Duration::from_secs(60),
            reply: Ok("too late".to_string()),
        }));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = engine.generate("m", "p", &cancel).await.unwrap_err();
        assert_eq!(err, LLMError::Cancelled);
    }
}
