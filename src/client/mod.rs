//! 客户端状态层
//!
//! - `api`: 类型化 HTTP 客户端
//! - `cache`: 按过滤条件缓存列表结果
//! - `controller`: 过滤、分页、变更与通知的协调者
//! - `views`: 纯视图模型（表单、统计卡片、聊天窗口）

mod api;
mod cache;
mod controller;
mod debounce;
mod notify;
mod types;
pub mod views;

pub use api::{ClientError, TaskApiClient};
pub use cache::{CacheLookup, QueryCache};
pub use controller::{FilterChange, TaskController};
pub use debounce::Debouncer;
pub use notify::{Notification, NotificationKind, Notifications};
pub use types::{TaskDraft, TaskFilters, TaskList, TaskPatch};
