//! HTTP Server - 路由、中间件与优雅停机

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::error::ApiError;
use crate::handlers::{self, admin, api};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 服务器选项
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// 监听地址 host:port
    pub bind_addr: String,
    pub cors: bool,
}

/// 创建路由
///
/// 管理接口只在远程后端可用时注册。
pub fn create_router(state: Arc<AppState>, cors: bool) -> Router {
    let mut router = Router::new()
        // 健康检查
        .route("/healthz", get(handlers::healthz))
        .route("/version", get(handlers::version))
        // 聊天
        .route("/api/chat", post(api::chat))
        .route("/api/history/:session_id", get(api::history))
        // 模型
        .route("/api/models", get(api::list_models))
        .route("/api/models/:name/health", get(api::model_health))
        // 会话管理
        .route(
            "/api/sessions",
            post(api::create_session).get(api::list_sessions),
        );

    if state.runtime().is_some() {
        router = router.route("/admin/models/pull", post(admin::pull_model));
    }

    let build = state.build;
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // 请求 ID、访问日志、版本响应头与 panic 恢复
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-app-version"),
            header_value(build.version),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-app-commit"),
            header_value(build.commit),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-app-built-at"),
            header_value(build.built_at),
        ))
        .layer(CatchPanicLayer::custom(handle_panic));

    let mut router = router.with_state(state).layer(middleware);
    if cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("handler panicked: {}", detail);
    ApiError::internal("internal server error").into_response()
}

/// 运行 HTTP 服务器，收到 SIGINT/SIGTERM 后优雅停机
pub async fn run_server(state: Arc<AppState>, options: ServerOptions) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&options.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", options.bind_addr, e))?;

    info!(
        "Ember gateway listening on http://{} (backend: {})",
        listener.local_addr()?,
        state.backend_kind()
    );

    let app = create_router(state, options.cors);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// 等待 Ctrl-C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
