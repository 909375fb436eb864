use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub runtime: RuntimeConfig,
    pub readiness: ReadinessSettings,
    pub fallback: FallbackConfig,
    pub logging: LoggingConfig,
}

/// Server 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: bool,
    /// 单个请求的最长处理时间（秒）
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors: true,
            request_timeout_seconds: 300,
        }
    }
}

impl ServerConfig {
    /// 监听地址 host:port
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// 应用 `8080`、`:8080` 或 `host:port` 形式的地址
    pub fn apply_addr(&mut self, addr: &str) -> ConfigResult<()> {
        let addr = addr.trim();
        let (host, port) = match addr.rsplit_once(':') {
            Some((host, port)) => (Some(host), port),
            None => (None, addr),
        };

        self.port = port
            .parse()
            .map_err(|_| ConfigError::Validation(format!("Invalid listen address: {}", addr)))?;
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.host = host.to_string();
        }
        Ok(())
    }
}

/// 模型运行时（Ollama）连接配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub base_url: String,
    /// 普通请求超时（秒）
    pub timeout_seconds: u64,
    /// 拉取模型超时（秒），None 表示不限制
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_timeout_seconds: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 240,
            pull_timeout_seconds: None,
        }
    }
}

impl RuntimeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn pull_timeout(&self) -> Option<Duration> {
        self.pull_timeout_seconds.map(Duration::from_secs)
    }
}

/// 启动就绪探测配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReadinessSettings {
    pub enabled: bool,
    pub timeout_ms: u64,
    pub interval_ms: u64,
    pub required_models: Vec<String>,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 180_000,
            interval_ms: 2_000,
            required_models: vec![
                "gemma3:270m".to_string(),
                "smollm:135m".to_string(),
                "deepseek-r1:1.5b".to_string(),
            ],
        }
    }
}

impl ReadinessSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout_ms = timeout.as_millis() as u64;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval_ms = interval.as_millis() as u64;
    }
}

/// 离线回退（echo）配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
    pub models: Vec<String>,
    pub echo_latency_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "llama2".to_string(),
                "mistral".to_string(),
                "phi3".to_string(),
            ],
            echo_latency_ms: 30,
        }
    }
}

impl FallbackConfig {
    pub fn echo_latency(&self) -> Duration {
        Duration::from_millis(self.echo_latency_ms)
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// 输出 JSON 格式日志
    pub json: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
