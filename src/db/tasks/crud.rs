//! Basic CRUD operations for tasks

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::{fold_case, TASK_FIELDS};
use crate::db::{DbPool, NewTask, TaskChanges, TaskRecord};
use crate::utils::format_instant;

pub async fn insert_task(pool: &DbPool, params: NewTask<'_>) -> Result<TaskRecord, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = format_instant(Utc::now());
    let due_date = params.due_date.map(format_instant);

    let sql = format!(
        "INSERT INTO tasks (id, title, description, priority, status, due_date, created_at, updated_at, \
         title_folded, description_folded) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
        TASK_FIELDS
    );
    let task = sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(&id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.priority)
        .bind(params.status)
        .bind(due_date)
        .bind(&now)
        .bind(&now)
        .bind(fold_case(params.title))
        .bind(fold_case(params.description))
        .fetch_one(pool)
        .await?;

    tracing::debug!(
        task_id = %task.id,
        title = %task.title,
        priority = ?task.priority,
        status = ?task.status,
        due_date = ?task.due_date,
        "Task created"
    );
    Ok(task)
}

pub async fn get_task_by_id(pool: &DbPool, id: &str) -> Result<Option<TaskRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_FIELDS);
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// 只写入提供的字段，并刷新 updated_at；任务不存在时返回 `None`
pub async fn update_task(
    pool: &DbPool,
    id: &str,
    changes: TaskChanges<'_>,
) -> Result<Option<TaskRecord>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET updated_at = ");
    builder.push_bind(format_instant(Utc::now()));

    if let Some(title) = changes.title {
        builder.push(", title = ").push_bind(title);
        builder.push(", title_folded = ").push_bind(fold_case(title));
    }
    if let Some(description) = changes.description {
        builder.push(", description = ").push_bind(description);
        builder
            .push(", description_folded = ")
            .push_bind(fold_case(description));
    }
    if let Some(priority) = changes.priority {
        builder.push(", priority = ").push_bind(priority);
    }
    if let Some(status) = changes.status {
        builder.push(", status = ").push_bind(status);
    }
    if let Some(due_date) = changes.due_date {
        builder.push(", due_date = ").push_bind(due_date.map(format_instant));
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING ").push(TASK_FIELDS);

    let task = builder
        .build_query_as::<TaskRecord>()
        .fetch_optional(pool)
        .await?;

    tracing::debug!(
        task_id = %id,
        found = task.is_some(),
        title = ?changes.title,
        priority = ?changes.priority,
        status = ?changes.status,
        due_date = ?changes.due_date,
        "Task updated"
    );
    Ok(task)
}

/// 硬删除；返回是否真的删除了一行
pub async fn delete_task(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    let deleted = result.rows_affected() > 0;
    tracing::debug!(task_id = %id, deleted, "Task deleted");
    Ok(deleted)
}
