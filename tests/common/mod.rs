#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use taskmate::{api, build_state, AppConfig};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub fn memory_config() -> AppConfig {
    AppConfig {
        database_url: Some("sqlite::memory:".to_string()),
        ..Default::default()
    }
}

pub async fn test_app(config: AppConfig) -> Router {
    let state = build_state(config).await.unwrap();
    api::router(state).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    into_test_response(app.clone().oneshot(request).await.unwrap()).await
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> TestResponse {
    into_test_response(app.clone().oneshot(request).await.unwrap()).await
}

async fn into_test_response(response: axum::response::Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

/// 在随机端口上启动完整服务，返回 API 根地址
pub async fn spawn_server(config: AppConfig) -> String {
    let app = test_app(config).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{}/api", addr)
}

/// Gemini 收到的一次请求
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub model_action: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct GeminiStub {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl GeminiStub {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn gemini_text(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

/// 本地 Gemini 替身：记录请求并返回固定响应
pub async fn spawn_gemini(status: StatusCode, reply: Value) -> GeminiStub {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        reply,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/v1beta/models/{model_action}", post(generate_content))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    GeminiStub {
        base_url: format!("http://{}", addr),
        seen,
    }
}

async fn generate_content(
    State(state): State<StubState>,
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push(SeenRequest {
        model_action,
        api_key,
        body,
    });
    (state.status, Json(state.reply.clone()))
}
