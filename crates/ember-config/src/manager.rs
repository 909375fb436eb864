use crate::config::{Config, ConfigError, ConfigResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// 加载配置文件；文件不存在时使用默认配置（不会写入磁盘）
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = tokio::fs::read_to_string(path).await?;
            let content = Self::expand_env_vars(&content)?;
            serde_json::from_str(&content)?
        } else {
            debug!("Config file {:?} not found, using defaults", path);
            Config::default()
        };

        Self::validate(&config)?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// 取出配置
    pub fn into_config(self) -> Config {
        self.config
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        // 验证服务器端口
        if config.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if config.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Server request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        // 验证运行时地址
        let base_url = config.runtime.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "Runtime base_url must be an http(s) URL, got '{}'",
                config.runtime.base_url
            )));
        }

        if config.runtime.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Runtime timeout_seconds must be greater than 0".to_string(),
            ));
        }

        // 验证就绪探测
        if config.readiness.enabled {
            if config.readiness.timeout_ms == 0 {
                return Err(ConfigError::Validation(
                    "Readiness timeout must be greater than 0".to_string(),
                ));
            }
            if config.readiness.interval_ms == 0 {
                return Err(ConfigError::Validation(
                    "Readiness interval must be greater than 0".to_string(),
                ));
            }
        }

        if config.fallback.models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "Fallback model names cannot be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    fn expand_env_vars(content: &str) -> ConfigResult<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_expr = &cap[1];

            // 处理 ${VAR:-default} 语法
            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
                },
            };

            result = result.replace(full_match, &replacement);
        }

        Ok(result)
    }
}
