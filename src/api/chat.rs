//! 聊天与建议 handler

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::app_state::AppState;
use crate::error::{ApiError, AppError};
use crate::services::ChatMessage;
use crate::utils::format_instant;

use super::extract::ApiJson;
use super::types::{ApiResponse, ChatReply, ChatRequest, SuggestionsData};

pub async fn chat(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    let fail = state.failure("Failed to process chat message");

    let message = payload.message_text().ok_or_else(|| {
        fail.wrap(AppError::InvalidInput(
            "Message is required and must be a string".to_string(),
        ))
    })?;

    let history: Vec<ChatMessage> = payload
        .conversation_history
        .iter()
        .cloned()
        .map(ChatMessage::from)
        .collect();

    let reply = state
        .ai
        .assistant
        .chat(&state.db, message, history)
        .await
        .map_err(|e| fail.wrap(e))?;

    Ok(Json(ApiResponse::ok(ChatReply {
        message: reply,
        timestamp: format_instant(Utc::now()),
    })))
}

pub async fn suggestions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SuggestionsData>>, ApiError> {
    let fail = state.failure("Failed to generate suggestions");
    let (suggestions, stats) = state
        .ai
        .assistant
        .suggestions(&state.db, Utc::now())
        .await
        .map_err(|e| fail.wrap(e))?;
    Ok(Json(ApiResponse::ok(SuggestionsData { suggestions, stats })))
}
