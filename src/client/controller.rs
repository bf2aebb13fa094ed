//! 列表页的状态协调：过滤条件、缓存、变更后的失效与提示

use tokio::sync::{watch, Mutex};

use crate::api::{ApiResponse, TaskView};
use crate::db::{SortField, SortOrder, TaskPriority, TaskStatus};

use super::api::{ClientError, TaskApiClient};
use super::cache::{CacheLookup, QueryCache};
use super::debounce::Debouncer;
use super::notify::{Notification, Notifications};
use super::types::{TaskDraft, TaskFilters, TaskList, TaskPatch};
use super::views::ChatWidget;

/// 单个过滤条件的变更
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Status(Option<TaskStatus>),
    Priority(Option<TaskPriority>),
    Search(String),
    Sort(SortField, SortOrder),
    Limit(u32),
    /// 唯一不会把页码重置为 1 的变更
    Page(u32),
}

impl TaskFilters {
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Page(page) => {
                self.page = page.max(1);
                return;
            }
            FilterChange::Status(status) => self.status = status,
            FilterChange::Priority(priority) => self.priority = priority,
            FilterChange::Search(search) => self.search = search,
            FilterChange::Sort(field, order) => {
                self.sort_by = field;
                self.sort_order = order;
            }
            FilterChange::Limit(limit) => self.limit = limit.clamp(1, 100),
        }
        self.page = 1;
    }
}

struct ControllerState {
    filters: TaskFilters,
    cache: QueryCache<TaskFilters, TaskList>,
    notifications: Notifications,
}

pub struct TaskController {
    api: TaskApiClient,
    state: Mutex<ControllerState>,
    search: Debouncer,
}

impl TaskController {
    pub fn new(api: TaskApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(ControllerState {
                filters: TaskFilters::default(),
                cache: QueryCache::default(),
                notifications: Notifications::new(),
            }),
            search: Debouncer::default(),
        }
    }

    pub fn api(&self) -> &TaskApiClient {
        &self.api
    }

    pub async fn filters(&self) -> TaskFilters {
        self.state.lock().await.filters.clone()
    }

    pub async fn apply(&self, change: FilterChange) {
        self.state.lock().await.filters.apply(change);
    }

    /// 搜索输入防抖 300 ms；返回本次输入是否生效
    pub async fn search_input(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        if !self.search.settle().await {
            return false;
        }
        self.apply(FilterChange::Search(text)).await;
        true
    }

    /// 当前过滤条件下已缓存的结果（可能已过期）
    pub async fn cached(&self) -> Option<CacheLookup<TaskList>> {
        let state = self.state.lock().await;
        state.cache.get(&state.filters)
    }

    /// 缓存变化的订阅
    pub async fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.lock().await.cache.subscribe()
    }

    /// 新鲜时直接返回缓存，否则重新拉取
    pub async fn load(&self) -> Result<TaskList, ClientError> {
        let (filters, epoch) = {
            let state = self.state.lock().await;
            if let Some(CacheLookup::Fresh(list)) = state.cache.get(&state.filters) {
                return Ok(list);
            }
            (state.filters.clone(), state.cache.epoch())
        };

        match self.api.list_tasks(&filters).await {
            Ok(list) => {
                self.state
                    .lock()
                    .await
                    .cache
                    .insert_fetched(filters, list.clone(), epoch);
                Ok(list)
            }
            Err(err) => {
                self.fail(&err, "Failed to fetch tasks").await;
                Err(err)
            }
        }
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<TaskView, ClientError> {
        let result = self.api.create_task(draft).await;
        self.finish_mutation(result, "Task created successfully", "Failed to create task")
            .await
    }

    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskView, ClientError> {
        let result = self.api.update_task(id, patch).await;
        self.finish_mutation(result, "Task updated successfully", "Failed to update task")
            .await
    }

    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<TaskView, ClientError> {
        let result = self.api.update_task_status(id, status).await;
        self.finish_mutation(result, "Task status updated", "Failed to update task status")
            .await
    }

    /// 点击状态按钮：todo → in-progress → completed → todo
    pub async fn cycle_status(&self, task: &TaskView) -> Result<TaskView, ClientError> {
        self.set_status(&task.id, task.status.next()).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        match self.api.delete_task(id).await {
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Task deleted successfully".to_string());
                self.succeed(message).await;
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Failed to delete task").await;
                Err(err)
            }
        }
    }

    /// 发送聊天消息并把回复写入聊天窗口
    pub async fn send_chat(&self, widget: &mut ChatWidget, text: &str) -> Result<(), ClientError> {
        let Some(history) = widget.begin_send(text) else {
            return Ok(());
        };
        match self.api.chat(text.trim(), &history).await {
            Ok(reply) => {
                widget.receive_reply(reply);
                Ok(())
            }
            Err(err) => {
                widget.receive_error();
                self.fail(&err, "Failed to process chat message").await;
                Err(err)
            }
        }
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.active()
    }

    pub async fn dismiss(&self, id: u64) {
        self.state.lock().await.notifications.dismiss(id);
    }

    async fn finish_mutation(
        &self,
        result: Result<ApiResponse<TaskView>, ClientError>,
        success_fallback: &str,
        failure_fallback: &str,
    ) -> Result<TaskView, ClientError> {
        match result {
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| success_fallback.to_string());
                self.succeed(message).await;
                response.data.ok_or(ClientError::MissingData)
            }
            Err(err) => {
                self.fail(&err, failure_fallback).await;
                Err(err)
            }
        }
    }

    async fn succeed(&self, message: String) {
        let mut state = self.state.lock().await;
        state.cache.invalidate_all();
        state.notifications.success(message);
    }

    async fn fail(&self, err: &ClientError, fallback: &str) {
        tracing::warn!(error = %err, "Task request failed");
        let message = err.server_message().unwrap_or(fallback).to_string();
        self.state.lock().await.notifications.error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn offline_controller() -> Arc<TaskController> {
        let api = TaskApiClient::new("http://127.0.0.1:9/api").unwrap();
        Arc::new(TaskController::new(api))
    }

    #[tokio::test(start_paused = true)]
    async fn search_input_applies_last_text_after_pause() {
        let controller = offline_controller();
        controller.apply(FilterChange::Page(3)).await;

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.search_input("rep").await }
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        // 第一次输入尚未生效
        assert_eq!(controller.filters().await.search, "");
        assert_eq!(controller.filters().await.page, 3);

        let second = tokio::spawn({
            let controller = controller.clone();
            async move { controller.search_input("report").await }
        });

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
        let filters = controller.filters().await;
        assert_eq!(filters.search, "report");
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn filter_changes_reset_page_except_page_change() {
        let mut filters = TaskFilters::default();
        filters.apply(FilterChange::Page(4));
        assert_eq!(filters.page, 4);

        filters.apply(FilterChange::Status(Some(TaskStatus::Completed)));
        assert_eq!(filters.page, 1);
        assert_eq!(filters.status, Some(TaskStatus::Completed));

        filters.apply(FilterChange::Page(2));
        filters.apply(FilterChange::Sort(SortField::Title, SortOrder::Asc));
        assert_eq!(filters.page, 1);
        assert_eq!(filters.sort_by, SortField::Title);

        filters.apply(FilterChange::Limit(500));
        assert_eq!(filters.limit, 100);
        filters.apply(FilterChange::Page(0));
        assert_eq!(filters.page, 1);
    }
}
