//! 统一错误类型定义
//!
//! 使用 `thiserror` 简化错误类型定义，
//! 提供 `AppError` 枚举和 `AppResult` 类型别名，
//! 并负责把错误渲染成统一的失败信封 `{ success: false, error, details? }`。

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::services::LlmError;

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 应用级统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 迁移错误
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// 文件操作错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 字段校验错误（逐字段报告）
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// 请求格式错误（单条消息）
    #[error("{0}")]
    InvalidInput(String),

    /// 资源未找到
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// 请求过于频繁
    #[error("Too many requests from this IP, please try again later.")]
    RateLimited { retry_after_secs: u64 },

    /// 配置错误
    #[error("configuration error: {0}")]
    Config(String),

    /// AI 服务错误
    #[error(transparent)]
    AiService(#[from] LlmError),

    /// 业务逻辑错误
    #[error("{0}")]
    Business(String),
}

impl AppError {
    pub fn task_not_found(id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity: "Task",
            id: id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::AiService(err) if err.is_auth() => StatusCode::UNAUTHORIZED,
            AppError::AiService(err) if err.is_quota() => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 4xx 错误对调用方有意义，直接返回自身消息
    fn client_message(&self) -> Option<String> {
        match self {
            AppError::AiService(err) if err.is_auth() => {
                Some("Invalid or missing Gemini API key".to_string())
            }
            AppError::AiService(err) if err.is_quota() => {
                Some("API quota exceeded. Please try again later.".to_string())
            }
            _ if self.status_code().is_client_error() => Some(self.to_string()),
            _ => None,
        }
    }
}

// ========== From 实现：String 和 &str ==========

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Business(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Business(s.to_string())
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

// axum 默认的 rejection 是纯文本，这里统一转成失败信封
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// 应用级 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

// ========== HTTP 失败信封 ==========

/// 失败信封
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 带上下文的 HTTP 错误
///
/// `context` 是该操作的通用失败消息（例如 "Failed to fetch tasks"），
/// 只在 5xx 时对外展示；`expose_details` 为 true 时附带内部错误详情。
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub context: &'static str,
    pub expose_details: bool,
}

impl ApiError {
    pub fn new(error: AppError, context: &'static str, expose_details: bool) -> Self {
        Self {
            error,
            context,
            expose_details,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        ApiError::new(error, "Internal server error", false)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();

        let body = match self.error.client_message() {
            Some(message) => {
                let details = match &self.error {
                    AppError::Validation(errors) => serde_json::to_value(errors).ok(),
                    _ => None,
                };
                ErrorBody {
                    success: false,
                    error: message,
                    details,
                }
            }
            None => {
                tracing::error!(error = %self.error, context = self.context, "request failed");
                ErrorBody {
                    success: false,
                    error: self.context.to_string(),
                    details: self
                        .expose_details
                        .then(|| Value::String(self.error.to_string())),
                }
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after_secs } = self.error {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

// ========== 扩展 trait：为 Result 添加上下文方法 ==========

/// 为 Result 类型添加错误上下文转换方法
pub trait ResultExt<T> {
    /// 将错误转换为配置错误
    fn config_err(self, msg: &str) -> AppResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn config_err(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Config(format!("{}: {}", msg, e)))
    }
}
