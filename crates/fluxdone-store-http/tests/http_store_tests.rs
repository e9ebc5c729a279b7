//! Wire-level tests for `HttpStore` against a mock backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use fluxdone_core::{NewTask, Priority, TaskId};
use fluxdone_store_http::{HttpStore, HttpStoreError};
use serde_json::json;
use time::macros::datetime;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TASK_ID: &str = "6f1c2f0e-8a52-4c1b-9d65-1c8f7f1f0a11";

fn task_json(title: &str, list: &str) -> serde_json::Value {
    json!({
        "id": TASK_ID,
        "title": title,
        "completed": false,
        "priority": 3,
        "dueDate": null,
        "list": list,
        "createdAt": "2025-03-01T09:00:00Z"
    })
}

fn store_for(server: &MockServer) -> HttpStore {
    HttpStore::new(&format!("{}/api", server.uri())).expect("valid base url")
}

#[tokio::test]
async fn fetch_tasks_accepts_bare_arrays() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("list", "work"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json("Review PR", "work")])))
        .mount(&server)
        .await;

    let tasks = store_for(&server).fetch_tasks("work").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Review PR");
    assert_eq!(tasks[0].priority, Priority::Low);
}

#[tokio::test]
async fn fetch_tasks_accepts_wrapped_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("list", "inbox"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "tasks": [task_json("Plan week", "inbox")] })),
        )
        .mount(&server)
        .await;

    let tasks = store_for(&server).fetch_tasks("inbox").await.unwrap();
    assert_eq!(tasks[0].list, "inbox");
}

#[tokio::test]
async fn create_task_posts_candidate_and_returns_assigned_id() {
    let server = MockServer::start().await;
    let candidate = NewTask::new("Buy milk", Priority::Low, "shopping", datetime!(2025-03-01 09:00 UTC))
        .expect("valid candidate");

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(json!({
            "title": "Buy milk",
            "completed": false,
            "priority": 3,
            "dueDate": null,
            "list": "shopping",
            "createdAt": "2025-03-01T09:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("Buy milk", "shopping")))
        .expect(1)
        .mount(&server)
        .await;

    let created = store_for(&server).create_task(&candidate).await.unwrap();
    assert_eq!(created.id.to_string(), TASK_ID);
    assert_eq!(created.title, "Buy milk");
}

#[tokio::test]
async fn set_completion_patches_task() {
    let server = MockServer::start().await;
    let id: TaskId = TASK_ID.parse().unwrap();
    Mock::given(method("PATCH"))
        .and(path(format!("/api/tasks/{TASK_ID}")))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": TASK_ID, "completed": true })))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).set_completion(id, true).await.unwrap();
}

#[tokio::test]
async fn delete_accepts_empty_success_body() {
    let server = MockServer::start().await;
    let id: TaskId = TASK_ID.parse().unwrap();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{TASK_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).delete_task(id).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    let id: TaskId = TASK_ID.parse().unwrap();
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = store_for(&server).delete_task(id).await.unwrap_err();
    match err {
        HttpStoreError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store_for(&server).fetch_tasks("inbox").await.unwrap_err();
    assert!(matches!(err, HttpStoreError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let store = HttpStore::new("http://127.0.0.1:9/api").unwrap();
    let err = store.fetch_tasks("inbox").await.unwrap_err();
    assert!(matches!(err, HttpStoreError::Transport(_)));
}
