//! Status update and aggregate operations for tasks

use chrono::{DateTime, Utc};

use super::TASK_FIELDS;
use crate::db::{DbPool, StatusCounts, TaskPriority, TaskRecord, TaskStatus};
use crate::utils::format_instant;

pub async fn update_task_status(
    pool: &DbPool,
    id: &str,
    status: TaskStatus,
) -> Result<Option<TaskRecord>, sqlx::Error> {
    let sql = format!(
        "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? RETURNING {}",
        TASK_FIELDS
    );
    let task = sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(status)
        .bind(format_instant(Utc::now()))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    tracing::debug!(task_id = %id, status = ?status, found = task.is_some(), "Task status updated");
    Ok(task)
}

/// 全表按状态分组计数
pub async fn count_by_status(pool: &DbPool) -> Result<StatusCounts, sqlx::Error> {
    let rows: Vec<(TaskStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM tasks GROUP BY status")
            .fetch_all(pool)
            .await?;

    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        counts.add(status, count);
    }
    Ok(counts)
}

/// 未完成且截止时间早于 now 的任务数
pub async fn count_overdue(pool: &DbPool, now: DateTime<Utc>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM tasks \
         WHERE status != 'completed' AND due_date IS NOT NULL AND due_date < ?",
    )
    .bind(format_instant(now))
    .fetch_one(pool)
    .await
}

/// 未完成的高优先级任务数
pub async fn count_high_priority_open(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE priority = ? AND status != 'completed'")
        .bind(TaskPriority::High)
        .fetch_one(pool)
        .await
}

/// 最近创建的 n 个任务
pub async fn list_recent_tasks(pool: &DbPool, n: u32) -> Result<Vec<TaskRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC LIMIT ?",
        TASK_FIELDS
    );
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(i64::from(n))
        .fetch_all(pool)
        .await
}
