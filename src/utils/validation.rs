//! 通用验证函数
//!
//! 提供集中的验证逻辑，避免在 handler 层重复验证代码。
//! 单字段校验返回 `FieldError`，由 `FieldErrors` 汇总成一次 400 响应。

use chrono::{DateTime, Utc};

use crate::db::{TaskPriority, TaskStatus};
use crate::error::{AppError, AppResult, FieldError};
use crate::utils::parse_instant;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// 验证标题：trim 后 1..=100 个字符
///
/// 返回 trim 后的字符串引用
pub fn validate_title(title: &str) -> Result<&str, FieldError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > TITLE_MAX_CHARS {
        return Err(FieldError::new(
            "title",
            "Title must be between 1 and 100 characters",
        ));
    }
    Ok(trimmed)
}

/// 验证描述：trim 后不超过 500 个字符
pub fn validate_description(description: &str) -> Result<&str, FieldError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(FieldError::new(
            "description",
            "Description cannot exceed 500 characters",
        ));
    }
    Ok(trimmed)
}

/// 解析任务状态
pub fn parse_status(raw: &str) -> Result<TaskStatus, FieldError> {
    TaskStatus::parse(raw).ok_or_else(|| {
        FieldError::new("status", "Status must be todo, in-progress, or completed")
    })
}

/// 解析优先级
pub fn parse_priority(raw: &str) -> Result<TaskPriority, FieldError> {
    TaskPriority::parse(raw)
        .ok_or_else(|| FieldError::new("priority", "Priority must be low, medium, or high"))
}

/// 解析截止日期
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    parse_instant(raw).ok_or_else(|| FieldError::new("dueDate", "Due date must be a valid date"))
}

/// 截止日期不能早于 now（仅创建时检查）
pub fn ensure_not_past(due: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, FieldError> {
    if due < now {
        return Err(FieldError::new("dueDate", "Due date cannot be in the past"));
    }
    Ok(due)
}

/// 验证限制值范围
pub fn validate_limit(limit: Option<i64>, default: u32, max: u32) -> u32 {
    limit
        .unwrap_or_else(|| i64::from(default))
        .clamp(1, i64::from(max)) as u32
}

/// 页码从 1 开始
pub fn validate_page(page: Option<i64>) -> u32 {
    page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
}

/// 收集多个字段的校验错误
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录失败并返回 `None`，成功时原样返回值
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}
