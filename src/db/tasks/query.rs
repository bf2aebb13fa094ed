//! Filtered listing for tasks

use sqlx::{QueryBuilder, Sqlite};

use super::{fold_case, TASK_FIELDS};
use crate::db::{count_by_status, DbPool, PageRequest, TaskFilter, TaskPage, TaskRecord, TaskSort};

/// 转义 LIKE 的通配符，`\` 作为 ESCAPE 字符
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a TaskFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ").push_bind(priority);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        // 与写入时同样折叠大小写，匹配 *_folded 列
        let pattern = like_pattern(&fold_case(search));
        builder
            .push(" AND (title_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

pub async fn count_tasks(pool: &DbPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks");
    push_filter(&mut builder, filter);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// 过滤 + 排序 + 分页；同值按 id 排序保证翻页稳定
pub async fn list_tasks(
    pool: &DbPool,
    filter: &TaskFilter,
    sort: TaskSort,
    page: PageRequest,
) -> Result<TaskPage, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM tasks", TASK_FIELDS));
    push_filter(&mut builder, filter);

    let order = sort.order.keyword();
    builder.push(format!(
        " ORDER BY {} {}, id {}",
        sort.field.column(),
        order,
        order
    ));
    builder
        .push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.skip());

    let tasks = builder
        .build_query_as::<TaskRecord>()
        .fetch_all(pool)
        .await?;
    let total = count_tasks(pool, filter).await?;
    let counts = count_by_status(pool).await?;

    tracing::debug!(
        status = ?filter.status,
        priority = ?filter.priority,
        search = ?filter.search,
        sort_field = ?sort.field,
        sort_order = ?sort.order,
        page = page.page,
        limit = page.limit,
        returned = tasks.len(),
        total,
        "Tasks listed"
    );
    Ok(TaskPage {
        tasks,
        total,
        counts,
    })
}
