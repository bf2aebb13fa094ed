//! HTTP 请求/响应类型模块
//!
//! 拆分为三个子模块：
//! - `task`: 任务相关类型
//! - `chat`: 聊天相关类型
//! - `common`: 通用信封与分页类型

mod chat;
mod common;
mod task;

// 导出任务相关类型
pub use task::{CreateTaskRequest, ListTasksQuery, TaskView, UpdateStatusRequest, UpdateTaskRequest};

// 导出聊天相关类型
pub use chat::{ChatReply, ChatRequest, HistoryEntry, SuggestionsData};

// 导出通用类型
pub use common::{ApiResponse, HealthResponse, Pagination, TaskStats};
