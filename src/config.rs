//! 分层配置加载（figment）
//!
//! 优先级从高到低：
//! 1. `TASKMATE_*` 前缀环境变量，`__` 分隔嵌套字段（如 `TASKMATE_RATE_LIMIT__MAX_REQUESTS`）
//! 2. 部署常用的裸环境变量：`DATABASE_URL`、`GEMINI_API_KEY`、`GEMINI_MODEL`、
//!    `GEMINI_BASE_URL`、`FRONTEND_URL`、`PORT`、`APP_ENV`
//! 3. 内置默认值
//!
//! `load_with_dotenv` 会先读取当前目录下的 `.env`。

use std::fs;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ResultExt};

const RAW_ENV_KEYS: [&str; 7] = [
    "DATABASE_URL",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "FRONTEND_URL",
    "PORT",
    "APP_ENV",
];

const DATABASE_FILE_NAME: &str = "taskmate.sqlite3";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

/// 固定窗口限流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

/// Provider 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 未设置时使用平台数据目录下的 SQLite 文件
    pub database_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub frontend_url: String,
    pub port: u16,
    pub app_env: AppEnv,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_base_url: None,
            frontend_url: "http://localhost:5173".to_string(),
            port: 5000,
            app_env: AppEnv::Development,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let config: Self = Self::figment()
            .extract()
            .config_err("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_dotenv() -> AppResult<Self> {
        // 没有 .env 文件是正常情况
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&RAW_ENV_KEYS))
            .merge(Env::prefixed("TASKMATE_").split("__"))
    }

    fn validate(&self) -> AppResult<()> {
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(AppError::Config(
                "rate limit max_requests and window_secs must be positive".to_string(),
            ));
        }
        if self.frontend_url.trim().is_empty() {
            return Err(AppError::Config("FRONTEND_URL must not be empty".to_string()));
        }
        Ok(())
    }

    /// 生产环境不对外暴露 5xx 错误详情
    pub fn expose_error_details(&self) -> bool {
        self.app_env != AppEnv::Production
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
        }
    }

    /// 返回数据库连接串；未配置时创建平台数据目录并指向其中的文件
    pub fn resolve_database_url(&self) -> AppResult<String> {
        if let Some(url) = self.database_url.as_deref().filter(|url| !url.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }

        let dirs = ProjectDirs::from("dev", "taskmate", "taskmate")
            .ok_or_else(|| AppError::Config("cannot determine data directory".to_string()))?;
        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join(DATABASE_FILE_NAME);
        Ok(format!("sqlite://{}", db_path.to_string_lossy()))
    }
}
