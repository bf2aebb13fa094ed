//! 类型化的任务 API 客户端

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::{
    ApiResponse, ChatReply, HealthResponse, HistoryEntry, SuggestionsData, TaskView,
};
use crate::db::TaskStatus;

use super::types::{TaskDraft, TaskFilters, TaskList, TaskPatch};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{error}")]
    Api {
        status: u16,
        error: String,
        details: Option<Value>,
    },

    #[error("response is missing data")]
    MissingData,
}

impl ClientError {
    /// 服务端返回的 `error` 文本
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { error, .. } if !error.is_empty() => Some(error),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            ClientError::MissingData => None,
        }
    }
}

#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload<'a> {
    message: &'a str,
    conversation_history: &'a [HistoryEntry],
}

#[derive(Serialize)]
struct StatusPayload {
    status: TaskStatus,
}

pub struct TaskApiClient {
    http: Client,
    base_url: String,
}

impl TaskApiClient {
    /// `base_url` 指向 API 根，例如 `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let failure = serde_json::from_str::<FailureBody>(&body).unwrap_or(FailureBody {
            error: status.canonical_reason().unwrap_or_default().to_string(),
            details: None,
        });
        tracing::debug!(status = status.as_u16(), error = %failure.error, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            error: failure.error,
            details: failure.details,
        })
    }

    pub async fn list_tasks(&self, filters: &TaskFilters) -> Result<TaskList, ClientError> {
        let request = self
            .http
            .get(self.url("/tasks"))
            .query(&filters.query_pairs());
        let response: ApiResponse<Vec<TaskView>> = self.send(request).await?;
        match (response.data, response.pagination, response.stats) {
            (Some(tasks), Some(pagination), Some(stats)) => Ok(TaskList {
                tasks,
                pagination,
                stats,
            }),
            _ => Err(ClientError::MissingData),
        }
    }

    pub async fn get_task(&self, id: &str) -> Result<TaskView, ClientError> {
        let response = self
            .send(self.http.get(self.url(&format!("/tasks/{}", id))))
            .await?;
        response.data.ok_or(ClientError::MissingData)
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<ApiResponse<TaskView>, ClientError> {
        self.send(self.http.post(self.url("/tasks")).json(draft)).await
    }

    pub async fn update_task(
        &self,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<ApiResponse<TaskView>, ClientError> {
        self.send(self.http.put(self.url(&format!("/tasks/{}", id))).json(patch))
            .await
    }

    pub async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<ApiResponse<TaskView>, ClientError> {
        self.send(
            self.http
                .patch(self.url(&format!("/tasks/{}/status", id)))
                .json(&StatusPayload { status }),
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<ApiResponse<()>, ClientError> {
        self.send(self.http.delete(self.url(&format!("/tasks/{}", id))))
            .await
    }

    pub async fn chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatReply, ClientError> {
        let payload = ChatPayload {
            message,
            conversation_history: history,
        };
        let response = self
            .send(self.http.post(self.url("/chat")).json(&payload))
            .await?;
        response.data.ok_or(ClientError::MissingData)
    }

    pub async fn suggestions(&self) -> Result<SuggestionsData, ClientError> {
        let response = self
            .send(self.http.get(self.url("/chat/suggestions")))
            .await?;
        response.data.ok_or(ClientError::MissingData)
    }

    /// 健康检查不使用成功信封
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }
}
