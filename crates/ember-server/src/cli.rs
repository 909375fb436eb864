//! 命令行参数，环境变量同样可用，优先级高于配置文件

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ember_config::{parse_duration, Config, ConfigResult};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ember-server")]
#[command(about = "Ember chat gateway in front of an Ollama runtime")]
#[command(version)]
pub struct Cli {
    /// Listen address: port, :port or host:port (overrides config)
    #[arg(long, env = "ADDR")]
    pub addr: Option<String>,

    /// Ollama base URL (overrides config)
    #[arg(long, env = "OLLAMA_BASE_URL")]
    pub ollama: Option<String>,

    /// Log level or filter directive (overrides RUST_LOG and config)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, env = "LOG_JSON", value_parser = parse_flag, num_args = 0..=1, default_missing_value = "true")]
    pub log_json: Option<bool>,

    /// Wait for the runtime before choosing a backend
    #[arg(long, env = "OLLAMA_WAIT", value_parser = parse_flag, num_args = 0..=1, default_missing_value = "true")]
    pub wait: Option<bool>,

    /// Readiness wait timeout, e.g. 180s or 3m
    #[arg(long, env = "OLLAMA_WAIT_TIMEOUT", value_parser = parse_duration_arg)]
    pub wait_timeout: Option<Duration>,

    /// Interval between readiness checks, e.g. 2s or 500ms
    #[arg(long, env = "OLLAMA_WAIT_INTERVAL", value_parser = parse_duration_arg)]
    pub wait_interval: Option<Duration>,

    /// Whitespace separated models the runtime must report
    #[arg(long, env = "OLLAMA_WAIT_MODELS")]
    pub wait_models: Option<String>,

    /// Config file path
    #[arg(long, env = "EMBER_CONFIG")]
    pub config: Option<String>,
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("invalid boolean: {}", other)),
    }
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    /// 配置文件路径，未指定时使用 ~/.ember/config.json
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => ember_config::expand_tilde(path),
            None => ember_config::default_config_path(),
        }
    }

    /// 将命令行覆盖项应用到配置
    pub fn apply(&self, config: &mut Config) -> ConfigResult<()> {
        if let Some(addr) = &self.addr {
            config.server.apply_addr(addr)?;
        }
        if let Some(url) = &self.ollama {
            config.runtime.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            // 指令形式（如 `ember_llm=debug`）只交给日志过滤器
            if let Ok(level) = level.parse() {
                config.logging.level = level;
            }
        }
        if let Some(json) = self.log_json {
            config.logging.json = json;
        }
        if let Some(wait) = self.wait {
            config.readiness.enabled = wait;
        }
        if let Some(timeout) = self.wait_timeout {
            config.readiness.set_timeout(timeout);
        }
        if let Some(interval) = self.wait_interval {
            config.readiness.set_interval(interval);
        }
        if let Some(models) = &self.wait_models {
            config.readiness.required_models =
                models.split_whitespace().map(str::to_string).collect();
        }
        Ok(())
    }
}
