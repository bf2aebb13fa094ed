pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod utils;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "taskmate=info,tower_http=info";

/// 初始化日志；`RUST_LOG` 优先
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // 重复初始化（例如测试里）时忽略错误
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 打开数据库、构建服务并组装路由所需的状态
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let database_url = config.resolve_database_url()?;
    let pool = db::init_pool(&database_url).await?;
    let ai = services::AiServices::new(config.provider())?;
    Ok(AppState::new(pool, ai, config))
}

/// 启动 HTTP 服务，直到收到 Ctrl-C
pub async fn run(config: AppConfig) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let frontend_url = config.frontend_url.clone();
    let app_env = config.app_env;

    let state = build_state(config).await?;
    let pruner = api::spawn_pruner(state.rate_limiter.clone());
    let app = api::router(state)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        frontend_url = %frontend_url,
        app_env = ?app_env,
        "Task manager API listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pruner.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
