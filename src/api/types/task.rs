//! 任务相关请求/响应类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::{TaskPriority, TaskRecord, TaskStatus};

/// 对外的任务表示；`_id` 与 `id` 同值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(rename = "_id")]
    pub legacy_id: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_overdue: bool,
}

impl TaskView {
    pub fn from_record(record: TaskRecord, now: DateTime<Utc>) -> Self {
        let is_overdue = record.is_overdue(now);
        Self {
            legacy_id: record.id.clone(),
            id: record.id,
            title: record.title,
            description: record.description,
            priority: record.priority,
            status: record.status,
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_overdue,
        }
    }
}

/// 列表查询参数；数值按宽松方式解析，非法值回落到默认值
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// 创建任务请求；枚举字段以字符串接收以便逐字段报告校验错误
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// 更新任务请求；`dueDate: null` 表示清空，缺省表示不修改
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// 字段出现（包括 null）即为 `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
