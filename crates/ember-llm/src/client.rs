use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{LLMError, Result};
use crate::runtime::{Generation, ModelRuntime, ModelTag};

/// Default overall timeout for regular calls. Generous so slow first-token
/// latency on a cold model does not trip it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(240);

/// Connection settings for [`OllamaClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the runtime, e.g. `http://localhost:11434`
    pub base_url: String,
    /// Timeout applied to ping, generate and tag listing
    pub timeout: Duration,
    /// Timeout for pulls. `None` means no limit.
    pub pull_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            pull_timeout: None,
        }
    }

    /// Set the regular call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pull timeout
    pub fn with_pull_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pull_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

/// HTTP client for an Ollama-compatible runtime
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    http_client: Client,
    pull_client: Client,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        let mut pull_builder = Client::builder();
        if let Some(timeout) = config.pull_timeout {
            pull_builder = pull_builder.timeout(timeout);
        }
        let pull_client = pull_builder
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            pull_client,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success status into an `Api` error carrying the body
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(LLMError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ModelRuntime for OllamaClient {
    async fn ping(&self) -> Result<()> {
        let response = self.http_client.get(self.url("/api/version")).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await.unwrap_or_default();
        debug!("ping response: {}", body);
        Ok(())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation> {
        let body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
        });

        let start = Instant::now();
        let response = self
            .http_client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let out: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Decode(e.to_string()))?;

        Ok(Generation {
            text: out.response,
            elapsed: start.elapsed(),
        })
    }

    async fn list_tags(&self) -> Result<Vec<ModelTag>> {
        let response = self.http_client.get(self.url("/api/tags")).send().await?;
        let response = Self::check_status(response).await?;
        let out: TagsResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Decode(e.to_string()))?;
        Ok(out.models)
    }

    async fn pull(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(LLMError::InvalidArgument("empty model name".to_string()));
        }

        let body = json!({
            "name": name,
            "stream": false,
        });
        let response = self
            .pull_client
            .post(self.url("/api/pull"))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await.unwrap_or_default();
        info!("pull {} response: {}", name, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> OllamaClient {
        OllamaClient::new(ClientConfig::new(server.url())).unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::new(ClientConfig::new("http://localhost:11434/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[tokio::test]
    async fn test_ping_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/version")
            .with_status(200)
            .with_body(r#"{"version":"0.6.2"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.ping().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/version")
            .with_status(503)
            .with_body("warming up")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.ping().await.unwrap_err();
        assert_eq!(
            err,
            LLMError::Api {
                status: 503,
                message: "warming up".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_ping_unreachable() {
        // Port 9 (discard) is essentially never served locally
        let client = OllamaClient::new(
            ClientConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = client.ping().await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
                "model": "gemma3:270m",
                "prompt": "hello",
                "stream": false,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"gemma3:270m","response":"hi there","done":true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let generation = client.generate("gemma3:270m", "hello").await.unwrap();

        assert_eq!(generation.text, "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_error_carries_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'nope' not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.generate("nope", "hello").await.unwrap_err();
        match err {
            LLMError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("model 'nope' not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_bad_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.generate("m", "p").await.unwrap_err();
        assert!(matches!(err, LLMError::Decode(_)));
    }

    #[tokio::test]
    async fn test_list_tags() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(
                r#"{"models":[
                    {"name":"smollm:135m","model":"smollm:135m","digest":"abc","size":91739413,
                     "modified_at":"2025-01-10T09:12:30.123456789+01:00","details":{"family":"llama"}},
                    {"name":"gemma3:270m"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let tags = client.list_tags().await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "smollm:135m");
        assert_eq!(tags[0].size, 91739413);
        assert!(tags[0].modified_at.is_some());
        assert_eq!(tags[1].name, "gemma3:270m");
        assert_eq!(tags[1].digest, "");
    }

    #[tokio::test]
    async fn test_pull_empty_name_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/pull")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.pull("").await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidArgument(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pull_forwards_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/pull")
            .match_body(Matcher::Json(json!({"name": "smollm:135m", "stream": false})))
            .with_status(200)
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.pull("smollm:135m").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pull_failure_carries_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/pull")
            .with_status(500)
            .with_body("pull model manifest: file does not exist")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.pull("missing:latest").await.unwrap_err();
        assert!(err.to_string().contains("file does not exist"));
    }
}
