//! 任务 CRUD handler

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::app_state::AppState;
use crate::db::{
    self, NewTask, PageRequest, SortField, SortOrder, TaskChanges, TaskFilter, TaskPriority,
    TaskSort, TaskStatus,
};
use crate::error::{ApiError, AppError, FieldError};
use crate::utils::{
    ensure_not_past, parse_due_date, parse_priority, parse_status, validate_description,
    validate_limit, validate_page, validate_title, FieldErrors,
};

use super::extract::{ApiJson, ApiQuery};
use super::types::{
    ApiResponse, CreateTaskRequest, ListTasksQuery, Pagination, TaskStats, TaskView,
    UpdateStatusRequest, UpdateTaskRequest,
};

const DEFAULT_PAGE_LIMIT: u32 = 50;
const MAX_PAGE_LIMIT: u32 = 100;

type ApiResult<T> = Result<T, ApiError>;

/// "all" 或空串表示不过滤
fn filter_value(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && *value != "all")
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// 空串视为没有截止日期
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TaskView>>>> {
    let fail = state.failure("Failed to fetch tasks");

    let mut errors = FieldErrors::new();
    let status = filter_value(query.status.as_deref()).and_then(|raw| errors.check(parse_status(raw)));
    let priority =
        filter_value(query.priority.as_deref()).and_then(|raw| errors.check(parse_priority(raw)));
    let field = match query.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Some(SortField::CreatedAt),
        Some(raw) => errors.check(SortField::parse(raw).ok_or_else(|| {
            FieldError::new(
                "sortBy",
                "sortBy must be one of createdAt, updatedAt, title, description, priority, status, dueDate",
            )
        })),
    };
    errors.into_result().map_err(|e| fail.wrap(e))?;

    let filter = TaskFilter {
        status,
        priority,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let sort = TaskSort {
        field: field.unwrap_or(SortField::CreatedAt),
        order: SortOrder::parse_lenient(query.sort_order.as_deref()),
    };
    let page = PageRequest::new(
        validate_page(parse_number(query.page.as_deref())),
        validate_limit(parse_number(query.limit.as_deref()), DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
    );

    let result = db::list_tasks(&state.db, &filter, sort, page)
        .await
        .map_err(|e| fail.wrap(e))?;

    let now = Utc::now();
    let pagination = Pagination::new(page, result.total);
    let stats = TaskStats::from_page(&result);
    let tasks = result
        .tasks
        .into_iter()
        .map(|task| TaskView::from_record(task, now))
        .collect();

    Ok(Json(
        ApiResponse::ok(tasks)
            .with_pagination(pagination)
            .with_stats(stats),
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let fail = state.failure("Failed to fetch task");
    let task = db::get_task_by_id(&state.db, &id)
        .await
        .map_err(|e| fail.wrap(e))?
        .ok_or_else(|| fail.wrap(AppError::task_not_found(&id)))?;
    Ok(Json(ApiResponse::ok(TaskView::from_record(task, Utc::now()))))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskView>>)> {
    let fail = state.failure("Failed to create task");
    let now = Utc::now();

    let mut errors = FieldErrors::new();
    let title = errors.check(validate_title(payload.title.as_deref().unwrap_or_default()));
    let description = match payload.description.as_deref() {
        Some(raw) => errors.check(validate_description(raw)),
        None => Some(""),
    };
    let priority = match payload.priority.as_deref() {
        Some(raw) => errors.check(parse_priority(raw)),
        None => Some(TaskPriority::default()),
    };
    let status = match payload.status.as_deref() {
        Some(raw) => errors.check(parse_status(raw)),
        None => Some(TaskStatus::default()),
    };
    let due_date = match non_empty(payload.due_date) {
        Some(raw) => errors
            .check(parse_due_date(&raw).and_then(|due| ensure_not_past(due, now)))
            .map(Some),
        None => Some(None),
    };

    errors.into_result().map_err(|e| fail.wrap(e))?;

    // 没有校验错误时每个字段都已解析
    let (Some(title), Some(description), Some(priority), Some(status), Some(due_date)) =
        (title, description, priority, status, due_date)
    else {
        return Err(fail.wrap(AppError::InvalidInput("Validation failed".to_string())));
    };

    let task = db::insert_task(
        &state.db,
        NewTask {
            title,
            description,
            priority,
            status,
            due_date,
        },
    )
    .await
    .map_err(|e| fail.wrap(e))?;

    tracing::info!(task_id = %task.id, "Task created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TaskView::from_record(task, now)).with_message("Task created successfully")),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let fail = state.failure("Failed to update task");

    let mut errors = FieldErrors::new();
    let title = payload
        .title
        .as_deref()
        .and_then(|raw| errors.check(validate_title(raw)));
    let description = payload
        .description
        .as_deref()
        .and_then(|raw| errors.check(validate_description(raw)));
    let priority = payload
        .priority
        .as_deref()
        .and_then(|raw| errors.check(parse_priority(raw)));
    let status = payload
        .status
        .as_deref()
        .and_then(|raw| errors.check(parse_status(raw)));
    // 更新时不检查截止日期是否已过
    let due_date = match payload.due_date {
        None => None,
        Some(raw) => match non_empty(raw) {
            None => Some(None),
            Some(raw) => errors.check(parse_due_date(&raw)).map(Some),
        },
    };
    errors.into_result().map_err(|e| fail.wrap(e))?;

    let changes = TaskChanges {
        title,
        description,
        priority,
        status,
        due_date,
    };
    let task = db::update_task(&state.db, &id, changes)
        .await
        .map_err(|e| fail.wrap(e))?
        .ok_or_else(|| fail.wrap(AppError::task_not_found(&id)))?;

    Ok(Json(
        ApiResponse::ok(TaskView::from_record(task, Utc::now()))
            .with_message("Task updated successfully"),
    ))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let fail = state.failure("Failed to update task status");

    let status = payload
        .status
        .as_deref()
        .and_then(TaskStatus::parse)
        .ok_or_else(|| fail.wrap(AppError::InvalidInput("Invalid status value".to_string())))?;

    let task = db::update_task_status(&state.db, &id, status)
        .await
        .map_err(|e| fail.wrap(e))?
        .ok_or_else(|| fail.wrap(AppError::task_not_found(&id)))?;

    Ok(Json(
        ApiResponse::ok(TaskView::from_record(task, Utc::now()))
            .with_message("Task status updated successfully"),
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let fail = state.failure("Failed to delete task");
    let deleted = db::delete_task(&state.db, &id)
        .await
        .map_err(|e| fail.wrap(e))?;
    if !deleted {
        return Err(fail.wrap(AppError::task_not_found(&id)));
    }
    tracing::info!(task_id = %id, "Task deleted");
    Ok(Json(ApiResponse::message_only("Task deleted successfully")))
}
