use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderConfig;

use super::types::{ChatMessage, ChatRole, GenerationOptions};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini 调用错误，携带鉴权/配额/其它三类区分
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing api key")]
    MissingApiKey,

    #[error("gemini rejected the api key: {0}")]
    Unauthorized(String),

    #[error("gemini quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gemini request failed: {status} {body}")]
    Provider { status: u16, body: String },

    #[error("gemini response missing text")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::MissingApiKey | LlmError::Unauthorized(_))
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }

    /// 按 HTTP 状态和错误正文归类非 2xx 响应
    pub fn classify(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || body.contains("API key")
        {
            LlmError::Unauthorized(body)
        } else if status == StatusCode::TOO_MANY_REQUESTS
            || body.contains("RESOURCE_EXHAUSTED")
            || body.contains("quota")
        {
            LlmError::QuotaExceeded(body)
        } else {
            LlmError::Provider {
                status: status.as_u16(),
                body,
            }
        }
    }
}

pub struct LlmService {
    client: Client,
    config: ProviderConfig,
}

impl LlmService {
    pub fn new(config: ProviderConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn has_api_key(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    pub async fn generate_chat(
        &self,
        messages: &[ChatMessage],
        options: GenerationOptions,
    ) -> Result<String, LlmError> {
        let api_key = self.config.api_key.trim();
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let contents: Vec<GeminiContent> = messages
            .iter()
            .filter(|message| !message.content.trim().is_empty())
            .map(|message| {
                let role = match message.role {
                    ChatRole::User | ChatRole::System => "user",
                    ChatRole::Assistant => "model",
                };
                GeminiContent {
                    role: role.to_string(),
                    parts: vec![GeminiPart {
                        text: message.content.clone(),
                    }],
                }
            })
            .collect();

        let request = GeminiGenerateRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: options.max_output_tokens,
                temperature: options.temperature,
            },
        };

        let base_url = build_base_url(self.config.base_url.as_deref());
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url, self.config.model
        );

        tracing::debug!(
            model = %self.config.model,
            turns = request.contents.len(),
            max_output_tokens = options.max_output_tokens,
            "Sending gemini request"
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Gemini request rejected");
            return Err(LlmError::classify(status, body));
        }

        let response: GeminiGenerateResponse = response.json().await?;

        let mut output = String::new();
        if let Some(candidate) = response.candidates.and_then(|list| list.into_iter().next()) {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        output.push_str(&text);
                    }
                }
            }
        }

        if output.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(output)
    }
}

fn build_base_url(base_url: Option<&str>) -> String {
    let base = base_url
        .unwrap_or(DEFAULT_GEMINI_BASE_URL)
        .trim()
        .trim_end_matches('/');
    if base.is_empty() {
        DEFAULT_GEMINI_BASE_URL.to_string()
    } else {
        base.to_string()
    }
}

#[derive(Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Clone)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Clone)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiGenerateResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    text: Option<String>,
}
