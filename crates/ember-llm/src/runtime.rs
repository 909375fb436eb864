use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A model installed in the remote runtime, as reported by `/api/tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTag {
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ModelTag {
    /// Tag with only a name, mostly useful for stubs
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: String::new(),
            digest: String::new(),
            size: 0,
            modified_at: None,
            details: None,
        }
    }
}

/// Generated text plus the wall-clock time it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub elapsed: Duration,
}

/// The model-serving process this gateway fronts.
///
/// Every call is a single network round trip; nothing is cached.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Reachability check
    async fn ping(&self) -> Result<()>;

    /// Single-turn, non-streaming generation
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation>;

    /// Models currently installed
    async fn list_tags(&self) -> Result<Vec<ModelTag>>;

    /// Download a model. Empty names are rejected without a network call.
    async fn pull(&self, name: &str) -> Result<()>;
}
