mod assistant;
mod context;
mod llm;
mod suggestions;
mod types;

use std::sync::Arc;

use crate::config::ProviderConfig;

pub use assistant::AssistantService;
pub use context::{build_chat_messages, build_task_context, RECENT_TASK_LIMIT, SYSTEM_INSTRUCTION};
pub use llm::{LlmError, LlmService};
pub use suggestions::{build_suggestions, SuggestionStats};
pub use types::*;

#[derive(Clone)]
pub struct AiServices {
    pub llm: Arc<LlmService>,
    pub assistant: Arc<AssistantService>,
}

impl AiServices {
    pub fn new(provider: ProviderConfig) -> Result<Self, LlmError> {
        let llm = Arc::new(LlmService::new(provider)?);
        if !llm.has_api_key() {
            tracing::warn!("GEMINI_API_KEY is not set; chat requests will be rejected");
        }
        let assistant = Arc::new(AssistantService::new(llm.clone()));
        Ok(Self { llm, assistant })
    }
}
