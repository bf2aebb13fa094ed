use std::{path::Path, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use super::{DbPool, MIGRATOR};
use crate::error::AppResult;

/// 按连接串初始化连接池并执行迁移
///
/// 支持文件库（`sqlite://path/to/file`）和内存库（`sqlite::memory:`）。
pub async fn init_pool(database_url: &str) -> AppResult<DbPool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    // 内存库没有 WAL，且每个连接都是独立的库，只能用单连接并且不能回收
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!(in_memory, "Database ready");
    Ok(pool)
}

/// 以文件路径初始化连接池
pub async fn init_pool_at(db_path: impl AsRef<Path>) -> AppResult<DbPool> {
    let db_url = format!("sqlite://{}", db_path.as_ref().to_string_lossy());
    init_pool(&db_url).await
}
