use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use ember_llm::{
    select_backend, wait_for_runtime, BackendConfig, BackendKind, Generation, LLMError,
    ModelRuntime, ModelTag, ReadinessConfig, ReadinessError,
};

/// Stub runtime that turns ready at a fixed instant.
///
/// `ping_override` forces the answer of pings issued after the readiness wait,
/// so the final ping can disagree with the wait outcome.
struct StubRuntime {
    ready_at: Option<Instant>,
    models: Vec<&'static str>,
    pings: AtomicUsize,
    ping_override: Option<(usize, bool)>,
}

impl StubRuntime {
    fn ready_after(delay: Duration, models: Vec<&'static str>) -> Self {
        Self {
            ready_at: Some(Instant::now() + delay),
            models,
            pings: AtomicUsize::new(0),
            ping_override: None,
        }
    }

    fn never_ready() -> Self {
        Self {
            ready_at: None,
            models: vec![],
            pings: AtomicUsize::new(0),
            ping_override: None,
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.ready_at, Some(at) if Instant::now() >= at)
    }
}

#[async_trait]
impl ModelRuntime for StubRuntime {
    async fn ping(&self) -> Result<(), LLMError> {
        let n = self.pings.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, ok)) = self.ping_override {
            if n > after {
                return if ok {
                    Ok(())
                } else {
                    Err(LLMError::Network("connection refused".to_string()))
                };
            }
        }
        if self.is_ready() {
            Ok(())
        } else {
            Err(LLMError::Network("connection refused".to_string()))
        }
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, LLMError> {
        Ok(Generation {
            text: format!("{}:{}", model, prompt),
            elapsed: Duration::from_millis(1),
        })
    }

    async fn list_tags(&self) -> Result<Vec<ModelTag>, LLMError> {
        if !self.is_ready() {
            return Err(LLMError::Network("connection refused".to_string()));
        }
        Ok(self.models.iter().map(|m| ModelTag::named(*m)).collect())
    }

    async fn pull(&self, _name: &str) -> Result<(), LLMError> {
        Ok(())
    }
}

fn readiness(timeout: Duration, models: &[&str]) -> ReadinessConfig {
    ReadinessConfig {
        interval: Duration::from_secs(2),
        timeout,
        required_models: models.iter().map(|m| m.to_string()).collect(),
    }
}

fn backend_config(readiness: Option<ReadinessConfig>) -> BackendConfig {
    BackendConfig {
        readiness,
        fallback_models: ["llama2", "mistral", "phi3"]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        echo_latency: Duration::from_millis(30),
    }
}

#[tokio::test(start_paused = true)]
async fn readiness_succeeds_shortly_after_runtime_turns_ready() {
    let ready_in = Duration::from_secs(5);
    let runtime = StubRuntime::ready_after(ready_in, vec!["gemma3:270m"]);
    let start = Instant::now();

    wait_for_runtime(&runtime, &readiness(Duration::from_secs(30), &["gemma3:270m"]))
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= ready_in);
    assert!(elapsed <= ready_in + Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn readiness_times_out_at_the_boundary_not_before() {
    let runtime = StubRuntime::never_ready();
    let start = Instant::now();

    let err = wait_for_runtime(&runtime, &readiness(Duration::from_secs(7), &[]))
        .await
        .unwrap_err();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(7));
    assert!(elapsed < Duration::from_secs(8));
    assert!(matches!(err, ReadinessError::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn readiness_waits_for_required_models() {
    // Reachable from the start but the model never shows up
    let runtime = StubRuntime::ready_after(Duration::ZERO, vec!["smollm:135m"]);

    let err = wait_for_runtime(&runtime, &readiness(Duration::from_secs(5), &["gemma3:270m"]))
        .await
        .unwrap_err();

    let ReadinessError::Timeout { last_error, .. } = err;
    assert!(last_error.contains("gemma3:270m"));
}

#[tokio::test(start_paused = true)]
async fn readiness_timeout_with_reachable_final_ping_selects_remote() {
    let mut runtime = StubRuntime::never_ready();
    // The wait pings at t = 0, 2, 4; the fourth ping is the final one
    runtime.ping_override = Some((3, true));
    let runtime = Arc::new(runtime);

    let config = backend_config(Some(readiness(Duration::from_secs(5), &[])));
    let backend = select_backend(runtime.clone(), &config).await;

    assert_eq!(backend.kind, BackendKind::Remote);
    assert!(backend.runtime.is_some());
    assert_eq!(runtime.pings.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn readiness_success_with_failing_final_ping_selects_echo() {
    let mut runtime = StubRuntime::ready_after(Duration::ZERO, vec![]);
    runtime.ping_override = Some((1, false));
    let runtime = Arc::new(runtime);

    let config = BackendConfig {
        readiness: Some(readiness(Duration::from_secs(5), &[])),
        fallback_models: vec!["llama2".to_string(), "phi3".to_string()],
        echo_latency: Duration::from_millis(30),
    };
    let backend = select_backend(runtime, &config).await;

    assert_eq!(backend.kind, BackendKind::Echo);
    assert!(backend.runtime.is_none());
    assert_eq!(backend.registry.list().await.unwrap(), vec!["llama2", "phi3"]);
    backend.registry.health_check("phi3").await.unwrap();
    assert!(matches!(
        backend.registry.health_check("gemma3:270m").await,
        Err(LLMError::UnknownModel(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn skipped_readiness_goes_straight_to_final_ping() {
    let runtime = Arc::new(StubRuntime::ready_after(Duration::ZERO, vec!["gemma3:270m"]));
    let config = backend_config(None);

    let backend = select_backend(runtime.clone(), &config).await;
    assert_eq!(backend.kind, BackendKind::Remote);
    assert_eq!(runtime.pings.load(Ordering::SeqCst), 1);

    let out = backend
        .engine
        .generate("gemma3:270m", "hi", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(out.text, "gemma3:270m:hi");
    assert_eq!(backend.registry.list().await.unwrap(), vec!["gemma3:270m"]);
}

#[tokio::test]
async fn echo_backend_generates_locally() {
    let runtime = Arc::new(StubRuntime::never_ready());
    let config = backend_config(None);

    let backend = select_backend(runtime, &config).await;
    assert_eq!(backend.kind, BackendKind::Echo);

    let start = std::time::Instant::now();
    let out = backend
        .engine
        .generate("demo-model", "hello", &CancellationToken::new())
        .await
        .unwrap();

    assert!(out.text.contains("demo-model"));
    assert!(out.text.contains("hello"));
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(
        backend.registry.list().await.unwrap(),
        vec!["llama2", "mistral", "phi3"]
    );
}
