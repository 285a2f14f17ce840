#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tasks_server::task::api::v1::TaskState;
use tasks_server::task::{IdAssignment, TaskStore};
use tasks_server::web::create_app;
use tower::ServiceExt;

/// Test context holding the application and a handle on its store.
pub struct TestContext {
    pub app: Router,
    pub state: Arc<TaskState>,
}

impl TestContext {
    /// Number of tasks currently held by the store.
    pub async fn task_count(&self) -> usize {
        self.state.store.lock().await.len()
    }
}

/// Sets up an application whose store holds the sample task.
pub fn setup() -> TestContext {
    setup_with_store(TaskStore::with_sample_task(IdAssignment::SequenceLength))
}

/// Sets up an application around the given store.
pub fn setup_with_store(store: TaskStore) -> TestContext {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let state = Arc::new(TaskState::new(store));
    TestContext {
        app: create_app(state.clone()),
        state,
    }
}

/// Raw HTTP response captured for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parses the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

/// Sends one request through the router. A JSON body sets the content type.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        body: body.to_vec(),
    }
}

/// HTTP response snapshot for testing endpoints.
#[derive(Debug, Serialize)]
pub struct ResponseSnapshot<T> {
    pub test_context: String,
    pub status: u16,
    pub body: T,
}

impl<T: DeserializeOwned> ResponseSnapshot<T> {
    pub fn new(response: &TestResponse, test_context: &str) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: response.status.as_u16(),
            body: response.json(),
        }
    }
}
