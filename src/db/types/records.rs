//! 数据库记录类型定义（FromRow）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::*;
use crate::utils::parse_instant;

/// 任务记录
///
/// 时间字段以定宽 UTC 文本存储（`%Y-%m-%dT%H:%M:%S%.3fZ`），
/// 因此字符串顺序即时间顺序。
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskRecord {
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_instant)
    }

    /// 未完成且截止时间早于 now 即为逾期；读取时计算，不落库
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status == TaskStatus::Completed {
            return false;
        }
        self.due_at().is_some_and(|due| due < now)
    }
}

/// 按状态分组的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.completed
    }

    pub(crate) fn add(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::Todo => self.todo += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Completed => self.completed += count,
        }
    }
}

/// 分页查询结果
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<TaskRecord>,
    /// 满足过滤条件的总数
    pub total: i64,
    /// 全表按状态计数
    pub counts: StatusCounts,
}
