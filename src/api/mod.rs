//! HTTP 路由层
//!
//! - `tasks`: 任务 CRUD
//! - `chat`: 聊天与建议
//! - `health`: 存活检查与 404
//! - `rate_limit`: 按客户端地址限流

mod chat;
mod extract;
mod health;
mod rate_limit;
mod tasks;
mod types;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::{AppResult, ResultExt};

pub use extract::{ApiJson, ApiQuery};
pub use rate_limit::{client_key, spawn_pruner, RateLimiter, RateStatus};
pub use types::*;

/// 请求体上限 10 MB
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> AppResult<Router> {
    let cors = build_cors_layer(&state.config.frontend_url)?;

    let api = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/status", patch(tasks::update_task_status))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/suggestions", get(chat::suggestions))
        .fallback(health::not_found);

    let app = api
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn build_cors_layer(frontend_url: &str) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url.trim().trim_end_matches('/'))
        .config_err("invalid FRONTEND_URL")?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
