use std::sync::Arc;

use crate::api::RateLimiter;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::{ApiError, AppError};
use crate::services::AiServices;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub ai: Arc<AiServices>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, ai: AiServices, config: AppConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit);
        Self {
            db,
            ai: Arc::new(ai),
            rate_limiter: Arc::new(rate_limiter),
            config: Arc::new(config),
        }
    }

    /// 绑定操作级失败消息，handler 里用 `.map_err(|e| fail.wrap(e))`
    pub fn failure(&self, context: &'static str) -> Failure {
        Failure {
            context,
            expose_details: self.config.expose_error_details(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Failure {
    context: &'static str,
    expose_details: bool,
}

impl Failure {
    pub fn wrap(self, error: impl Into<AppError>) -> ApiError {
        ApiError::new(error.into(), self.context, self.expose_details)
    }
}
