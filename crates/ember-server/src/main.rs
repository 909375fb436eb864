use std::sync::Arc;

use clap::Parser;
use ember_config::ConfigManager;
use ember_llm::{select_backend, BackendConfig, ClientConfig, OllamaClient, ReadinessConfig};
use ember_server::{logging::init_logging, run_server, AppState, Cli, ServerOptions};
use ember_session::MemoryStore;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（CLI 参数覆盖配置文件）
    let manager = match cli.config_path() {
        Some(path) => Some(
            ConfigManager::load(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load config from {:?}: {}", path, e))?,
        ),
        None => None,
    };
    // 日志初始化之后再报告配置来源
    let config_source = manager
        .as_ref()
        .map(|m| m.path().to_path_buf())
        .filter(|path| path.exists());
    let mut config = manager.map(ConfigManager::into_config).unwrap_or_default();
    cli.apply(&mut config)?;
    ConfigManager::validate(&config)?;

    init_logging(cli.log_level.as_deref(), &config.logging)?;

    let build = ember_server::BuildInfo::current();
    info!(
        "Starting Ember gateway {} (commit {}, built {})",
        build.version, build.commit, build.built_at
    );
    match &config_source {
        Some(path) => info!("  Config: {:?}", path),
        None => info!("  Config: built-in defaults"),
    }
    info!("  Runtime: {}", config.runtime.base_url);
    info!("  Listen: {}", config.server.bind_addr());

    let client = OllamaClient::new(
        ClientConfig::new(config.runtime.base_url.clone())
            .with_timeout(config.runtime.timeout())
            .with_pull_timeout(config.runtime.pull_timeout()),
    )?;

    let backend_config = BackendConfig {
        readiness: config.readiness.enabled.then(|| ReadinessConfig {
            interval: config.readiness.interval(),
            timeout: config.readiness.timeout(),
            required_models: config.readiness.required_models.clone(),
        }),
        fallback_models: config.fallback.models.clone(),
        echo_latency: config.fallback.echo_latency(),
    };
    let backend = select_backend(Arc::new(client), &backend_config).await;
    info!("Backend selected: {}", backend.kind);

    let state = AppState::new(Arc::new(MemoryStore::new()), backend)
        .with_request_timeout(config.server.request_timeout());

    run_server(
        Arc::new(state),
        ServerOptions {
            bind_addr: config.server.bind_addr(),
            cors: config.server.cors,
        },
    )
    .await
}
