//! 通用响应类型

use serde::{Deserialize, Serialize};

use crate::db::{PageRequest, StatusCounts, TaskPage};

/// 成功信封 `{ success: true, data?, message?, pagination?, stats? }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TaskStats>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
            stats: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_stats(mut self, stats: TaskStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

impl ApiResponse<()> {
    /// 只有消息、没有 data 的响应（删除）
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
            stats: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: PageRequest, total: i64) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages: page.page_count(total),
        }
    }
}

/// 列表统计：total 为过滤后的总数，其余为全表计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: i64,
    pub todo: i64,
    #[serde(rename = "in-progress")]
    pub in_progress: i64,
    pub completed: i64,
}

impl TaskStats {
    pub fn from_page(page: &TaskPage) -> Self {
        Self::new(page.total, &page.counts)
    }

    pub fn new(total: i64, counts: &StatusCounts) -> Self {
        Self {
            total,
            todo: counts.todo,
            in_progress: counts.in_progress,
            completed: counts.completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}
