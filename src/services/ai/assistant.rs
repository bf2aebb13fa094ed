use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::{self, DbPool};
use crate::error::AppResult;

use super::context::{build_chat_messages, build_task_context, RECENT_TASK_LIMIT};
use super::llm::LlmService;
use super::suggestions::{build_suggestions, SuggestionStats};
use super::types::{ChatMessage, CHAT_GENERATION};

/// 任务助手：读取任务统计作为上下文，再转发给 LLM
pub struct AssistantService {
    llm: Arc<LlmService>,
}

impl AssistantService {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self { llm }
    }

    pub async fn chat(
        &self,
        pool: &DbPool,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> AppResult<String> {
        let counts = db::count_by_status(pool).await?;
        let recent = db::list_recent_tasks(pool, RECENT_TASK_LIMIT).await?;

        let context = build_task_context(&counts, &recent);
        let history_len = history.len();
        let messages = build_chat_messages(&context, history, message);

        let reply = self.llm.generate_chat(&messages, CHAT_GENERATION).await?;
        tracing::info!(
            model = %self.llm.model(),
            history_len,
            reply_chars = reply.chars().count(),
            "Chat reply generated"
        );
        Ok(reply)
    }

    pub async fn suggestions(
        &self,
        pool: &DbPool,
        now: DateTime<Utc>,
    ) -> AppResult<(Vec<String>, SuggestionStats)> {
        let stats = SuggestionStats {
            overdue: db::count_overdue(pool, now).await?,
            high_priority: db::count_high_priority_open(pool).await?,
            todo: db::count_by_status(pool).await?.todo,
        };
        Ok((build_suggestions(&stats), stats))
    }
}
