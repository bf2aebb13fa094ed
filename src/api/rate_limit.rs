//! 按客户端地址的固定窗口限流

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::app_state::AppState;
use crate::config::RateLimitConfig;
use crate::error::AppError;

/// 超过这个数量的窗口时顺带清理过期项
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// 一次放行后的配额状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// 计一次请求；超限时返回 `Err(retry_after_secs)`
    pub async fn check(&self, key: &str) -> Result<RateStatus, u64> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() > PRUNE_THRESHOLD {
            self.drop_expired(&mut windows, now);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let remaining_window = self.window.saturating_sub(now.duration_since(entry.started));
        let reset_secs = ceil_secs(remaining_window);

        if entry.count >= self.max_requests {
            return Err(reset_secs);
        }
        entry.count += 1;

        Ok(RateStatus {
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_secs,
        })
    }

    /// 删除所有已过期的窗口，返回删除数量
    pub async fn prune(&self) -> usize {
        let mut windows = self.windows.lock().await;
        self.drop_expired(&mut windows, Instant::now())
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn drop_expired(&self, windows: &mut HashMap<String, Window>, now: Instant) -> usize {
        let before = windows.len();
        windows.retain(|_, entry| now.duration_since(entry.started) < self.window);
        before - windows.len()
    }
}

/// 后台定期清理过期窗口，直到 limiter 被释放
pub fn spawn_pruner(limiter: Arc<RateLimiter>) -> JoinHandle<()> {
    let weak = Arc::downgrade(&limiter);
    let period = limiter.window();
    drop(limiter);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即返回
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = weak.upgrade() else {
                break;
            };
            let removed = limiter.prune().await;
            if removed > 0 {
                let tracked = limiter.tracked_clients().await;
                tracing::debug!(removed, tracked, "pruned expired rate-limit windows");
            }
        }
    })
}

/// 向上取整到秒，至少 1 秒
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

/// 客户端地址：socket 对端，其次 X-Forwarded-For 的第一项，最后 "unknown"
pub fn client_key(peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = client_key(peer, request.headers());

    match state.rate_limiter.check(&key).await {
        Ok(status) => {
            let mut response = next.run(request).await;
            append_rate_limit_headers(response.headers_mut(), &status);
            response
        }
        Err(retry_after_secs) => {
            tracing::warn!(client = %key, retry_after_secs, "Rate limit exceeded");
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

fn append_rate_limit_headers(headers: &mut HeaderMap, status: &RateStatus) {
    if let Ok(v) = HeaderValue::from_str(&status.limit.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&status.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&status.reset_secs.to_string()) {
        headers.insert("x-ratelimit-reset", v);
    }
}
