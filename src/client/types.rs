//! 客户端请求/查询类型

use serde::Serialize;

use crate::api::{Pagination, TaskStats, TaskView};
use crate::db::{SortField, SortOrder, TaskPriority, TaskStatus};

/// 列表过滤条件，同时作为缓存键；`None` 表示 "all"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: String,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for TaskFilters {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            search: String::new(),
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 50,
        }
    }
}

impl TaskFilters {
    /// 查询参数；空搜索词不发送
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (
                "status",
                self.status.map_or("all", TaskStatus::as_str).to_string(),
            ),
            (
                "priority",
                self.priority.map_or("all", TaskPriority::as_str).to_string(),
            ),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("sortOrder", self.sort_order.as_str().to_string()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

/// 一页列表结果
#[derive(Debug, Clone, PartialEq)]
pub struct TaskList {
    pub tasks: Vec<TaskView>,
    pub pagination: Pagination,
    pub stats: TaskStats,
}

/// 创建任务的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// 更新任务的请求体；`due_date: Some(None)` 序列化为 null 以清空
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_query() {
        let pairs = TaskFilters::default().query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("status", "all".to_string()),
                ("priority", "all".to_string()),
                ("sortBy", "createdAt".to_string()),
                ("sortOrder", "desc".to_string()),
                ("page", "1".to_string()),
                ("limit", "50".to_string()),
            ]
        );
    }

    #[test]
    fn patch_serializes_clear_as_null() {
        let patch = TaskPatch {
            due_date: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "dueDate": null })
        );
        assert_eq!(
            serde_json::to_value(TaskPatch::default()).unwrap(),
            serde_json::json!({})
        );
    }
}
