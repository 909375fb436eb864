//! 结构化日志初始化
//!
//! 级别优先级：显式参数（`--log-level` / `LOG_LEVEL`）> `RUST_LOG` > 配置文件。

use ember_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 构建环境过滤器
pub fn build_filter(explicit: Option<&str>, config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Some(level) = explicit.filter(|l| !l.trim().is_empty()) {
        return EnvFilter::try_new(level.trim())
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::new(config.level.as_str()))
}

/// 初始化全局日志订阅者，只能调用一次
pub fn init_logging(explicit: Option<&str>, config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(explicit, config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true);
        registry
            .with(layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
    } else {
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        registry
            .with(layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
    }

    tracing::info!(
        "Logging initialized (format: {})",
        if config.json { "json" } else { "text" }
    );
    Ok(())
}
