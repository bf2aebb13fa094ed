use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    /// 历史记录里只有 "user" 是用户，其它角色一律视为模型回复
    pub fn from_history(raw: &str) -> Self {
        if raw == "user" {
            ChatRole::User
        } else {
            ChatRole::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }
}

/// Gemini generationConfig 中用到的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// 聊天助手使用的生成参数
pub const CHAT_GENERATION: GenerationOptions = GenerationOptions {
    max_output_tokens: 500,
    temperature: 0.7,
};
