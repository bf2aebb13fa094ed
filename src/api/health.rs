use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::error::ErrorBody;
use crate::utils::format_instant;

use super::types::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Task Manager API is running".to_string(),
        timestamp: format_instant(Utc::now()),
    })
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            error: "Route not found".to_string(),
            details: None,
        }),
    )
}
