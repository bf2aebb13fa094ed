//! Task database operations
//!
//! Split into submodules:
//! - `crud`: Basic CRUD operations (insert, get, update, delete)
//! - `status`: Status update and aggregate counts
//! - `query`: Filtered listing with sort and pagination

mod crud;
mod query;
mod status;

pub use crud::*;
pub use query::*;
pub use status::*;

/// Common fields for SELECT queries
pub(crate) const TASK_FIELDS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at";

/// 搜索匹配用的小写形式；SQLite 的 LIKE/lower() 只处理 ASCII
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
