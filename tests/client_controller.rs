mod common;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use taskmate::client::views::{ChatWidget, TaskForm};
use taskmate::client::{
    CacheLookup, FilterChange, NotificationKind, TaskApiClient, TaskController, TaskDraft,
    TaskPatch,
};
use taskmate::db::{TaskPriority, TaskStatus};

use common::{memory_config, spawn_server};

async fn controller() -> TaskController {
    let base_url = spawn_server(memory_config()).await;
    TaskController::new(TaskApiClient::new(base_url).unwrap())
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: String::new(),
        priority: TaskPriority::Medium,
        status: TaskStatus::Todo,
        due_date: None,
    }
}

#[tokio::test]
async fn health_check_reaches_server() {
    let controller = controller().await;
    let health = controller.api().health().await.unwrap();
    assert_eq!(health.status, "OK");
}

#[tokio::test]
async fn mutations_invalidate_cached_list() {
    let controller = controller().await;

    let empty = controller.load().await.unwrap();
    assert!(empty.tasks.is_empty());
    assert!(matches!(controller.cached().await, Some(CacheLookup::Fresh(_))));

    let mut generation = controller.subscribe().await;
    let created = controller.create(&draft("Buy milk")).await.unwrap();
    assert_eq!(created.title, "Buy milk");
    assert!(generation.has_changed().unwrap());
    assert!(matches!(controller.cached().await, Some(CacheLookup::Stale(_))));

    let list = controller.load().await.unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.stats.todo, 1);
    assert_eq!(list.pagination.total, 1);

    let notes = controller.notifications().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].message, "Task created successfully");
}

#[tokio::test]
async fn filters_change_the_fetched_page() {
    let controller = controller().await;
    controller.create(&draft("Alpha")).await.unwrap();
    let started = controller.create(&draft("Bravo")).await.unwrap();
    controller.cycle_status(&started).await.unwrap();

    controller
        .apply(FilterChange::Status(Some(TaskStatus::InProgress)))
        .await;
    let list = controller.load().await.unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].title, "Bravo");
    assert_eq!(list.stats.in_progress, 1);

    controller.apply(FilterChange::Status(None)).await;
    controller.apply(FilterChange::Search("alp".into())).await;
    let list = controller.load().await.unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].title, "Alpha");
}

#[tokio::test]
async fn server_errors_surface_as_notifications() {
    let controller = controller().await;

    let err = controller.create(&draft("   ")).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Validation failed"));

    let err = controller.delete("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let messages: Vec<(NotificationKind, String)> = controller
        .notifications()
        .await
        .into_iter()
        .map(|note| (note.kind, note.message))
        .collect();
    assert_eq!(
        messages,
        [
            (NotificationKind::Error, "Validation failed".to_string()),
            (NotificationKind::Error, "Task not found".to_string()),
        ]
    );
}

#[tokio::test]
async fn edit_form_round_trips_through_update() {
    let controller = controller().await;
    let task = controller.create(&draft("Draft essay")).await.unwrap();

    let mut form = TaskForm::edit(&task);
    form.title = "Final essay".to_string();
    form.priority = TaskPriority::High;
    let patch: TaskPatch = form.to_patch(Utc::now()).unwrap();

    let updated = controller.update(&task.id, &patch).await.unwrap();
    assert_eq!(updated.title, "Final essay");
    assert_eq!(updated.priority, TaskPriority::High);

    controller.delete(&task.id).await.unwrap();
    let last = controller.notifications().await.pop().unwrap();
    assert_eq!(last.message, "Task deleted successfully");
}

#[tokio::test]
async fn chat_failure_adds_fallback_reply() {
    let controller = controller().await;
    let mut widget = ChatWidget::new(0);
    widget.open();

    let err = controller.send_chat(&mut widget, "Help me plan").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!widget.is_pending());
    assert_eq!(widget.messages().len(), 3);

    let note = controller.notifications().await.pop().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.message, "Invalid or missing Gemini API key");
}

#[derive(Clone, Default)]
struct SlowList {
    list_started: Arc<Notify>,
    release_list: Arc<Notify>,
}

fn task_json(title: &str) -> Value {
    json!({
        "_id": "t1",
        "id": "t1",
        "title": title,
        "description": "",
        "priority": "medium",
        "status": "todo",
        "dueDate": null,
        "createdAt": "2026-01-01T00:00:00.000Z",
        "updatedAt": "2026-01-01T00:00:00.000Z",
        "isOverdue": false
    })
}

async fn slow_list(State(gate): State<SlowList>) -> Json<Value> {
    gate.list_started.notify_one();
    gate.release_list.notified().await;
    Json(json!({
        "success": true,
        "data": [],
        "pagination": { "page": 1, "limit": 50, "total": 0, "pages": 0 },
        "stats": { "total": 0, "todo": 0, "in-progress": 0, "completed": 0 }
    }))
}

async fn instant_create() -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": task_json("Buy milk"),
            "message": "Task created successfully"
        })),
    )
}

#[tokio::test]
async fn list_fetched_across_a_mutation_is_not_fresh() {
    let gate = SlowList::default();
    let app = Router::new()
        .route("/api/tasks", get(slow_list).post(instant_create))
        .with_state(gate.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = TaskApiClient::new(format!("http://{}/api", addr)).unwrap();
    let controller = Arc::new(TaskController::new(api));

    let in_flight = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load().await }
    });
    gate.list_started.notified().await;

    // 列表请求尚未返回时完成一次变更
    controller.create(&draft("Buy milk")).await.unwrap();
    gate.release_list.notify_one();

    let old = in_flight.await.unwrap().unwrap();
    assert!(old.tasks.is_empty());
    assert!(matches!(controller.cached().await, Some(CacheLookup::Stale(_))));
}
