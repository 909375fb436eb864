//! Startup readiness wait.
//!
//! Polls the runtime until it answers and (optionally) reports every required
//! model, bounded by an overall deadline.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{LLMError, Result};
use crate::runtime::ModelRuntime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Time between checks after the first one
    pub interval: Duration,
    /// Upper bound on the whole wait
    pub timeout: Duration,
    /// Models that must be installed. Empty means ping only.
    pub required_models: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("runtime not ready after {waited:?}: {last_error}")]
    Timeout { waited: Duration, last_error: String },
}

/// A single readiness check: ping, then make sure every required model is listed
pub async fn check_ready(runtime: &dyn ModelRuntime, required_models: &[String]) -> Result<()> {
    runtime.ping().await?;
    if required_models.is_empty() {
        return Ok(());
    }

    let tags = runtime.list_tags().await?;
    let missing: Vec<&str> = required_models
        .iter()
        .filter(|req| !tags.iter().any(|t| &t.name == *req))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LLMError::UnknownModel(missing.join(", ")))
    }
}

/// Wait until the runtime passes [`check_ready`] or the timeout elapses.
///
/// The first check runs immediately; later checks run once per interval.
pub async fn wait_for_runtime(
    runtime: &dyn ModelRuntime,
    config: &ReadinessConfig,
) -> std::result::Result<(), ReadinessError> {
    let start = Instant::now();
    let mut last_error = String::from("no check completed");

    let poll = async {
        let mut ticker = tokio::time::interval(config.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt: u32 = 0;

        loop {
            // The first tick completes immediately
            ticker.tick().await;
            attempt += 1;

            match check_ready(runtime, &config.required_models).await {
                Ok(()) => return,
                Err(e) => {
                    debug!("readiness attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }
    };

    match tokio::time::timeout(config.timeout, poll).await {
        Ok(()) => {
            info!("runtime ready after {:?}", start.elapsed());
            Ok(())
        }
        Err(_) => Err(ReadinessError::Timeout {
            waited: start.elapsed(),
            last_error,
        }),
    }
}
