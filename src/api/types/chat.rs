//! 聊天相关请求/响应类型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::{ChatMessage, ChatRole, SuggestionStats};

/// 聊天请求；`message` 以原始 JSON 接收，非字符串时返回统一的 400
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

impl ChatRequest {
    /// 非空字符串才是合法消息
    pub fn message_text(&self) -> Option<&str> {
        match &self.message {
            Some(Value::String(text)) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        ChatMessage::new(ChatRole::from_history(&entry.role), entry.content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsData {
    pub suggestions: Vec<String>,
    pub stats: SuggestionStats,
}
