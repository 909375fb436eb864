use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LLMError, Result};
use crate::runtime::ModelRuntime;

/// Reports which models are available
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Names of the currently available models
    async fn list(&self) -> Result<Vec<String>>;

    /// Succeeds iff `model` is in the current list
    async fn health_check(&self, model: &str) -> Result<()> {
        let models = self.list().await?;
        if models.iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(LLMError::UnknownModel(model.to_string()))
        }
    }
}

/// Registry answering from a fixed list
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    models: Vec<String>,
}

impl StaticRegistry {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ModelRegistry for StaticRegistry {
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.models.clone())
    }
}

/// Registry backed by the runtime's tag listing. Every call hits the network.
#[derive(Clone)]
pub struct RemoteRegistry {
    runtime: Arc<dyn ModelRuntime>,
}

impl RemoteRegistry {
    pub fn new(runtime: Arc<dyn ModelRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl ModelRegistry for RemoteRegistry {
    async fn list(&self) -> Result<Vec<String>> {
        let tags = self.runtime.list_tags().await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }
}
