//! Common test utilities for Wardrobo integration tests
//!
//! This file contains the shared setup for all integration tests: an app
//! backed by a fresh in-memory database and a temporary upload directory,
//! a stand-in for the hosted model API, and request helpers.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wardrobo::{
    ai::AiClient,
    config::AiConfig,
    create_app,
    db::{init_pool, DbPool},
    dto::PageSettings,
    models::{ClothingItemView, NewClothingItem},
    repo, run_migrations,
    storage::ImageStore,
    AppState,
};

/// Upload limit used by test apps
pub const TEST_MAX_UPLOAD_BYTES: u64 = 1024;

/// A running test application and the resources behind it
pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
    /// Holds the upload directory alive for the test's duration
    pub upload_dir: TempDir,
}

/// Options for building a test app
pub struct TestAppOptions {
    /// Base URL of the model API; AI is off when `None`
    pub ai_base_url: Option<String>,
    pub auto_tag: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            ai_base_url: None,
            auto_tag: true,
        }
    }
}

/// Creates a test application with a unique shared in-memory SQLite database
pub fn create_test_app(options: TestAppOptions) -> TestApp {
    let database_url = format!("file:test_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());
    run_migrations(&mut pool.get().unwrap()).unwrap();

    let upload_dir = tempfile::tempdir().unwrap();
    let ai = options.ai_base_url.map(|base_url| {
        AiClient::new(&AiConfig {
            api_key: "test-key".to_string(),
            base_url,
            text_model: "test-text-model".to_string(),
            vision_model: "test-vision-model".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    });

    let state = AppState {
        pool: pool.clone(),
        ai,
        storage: ImageStore::local(upload_dir.path(), "/uploads"),
        page_settings: PageSettings::default(),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        auto_tag: options.auto_tag,
    };

    TestApp {
        app: create_app(state),
        pool,
        upload_dir,
    }
}

/// Creates a test app whose model API is `mock`
pub fn create_test_app_with_ai(mock: &MockAi) -> TestApp {
    create_test_app(TestAppOptions {
        ai_base_url: Some(mock.base_url.clone()),
        ..Default::default()
    })
}

/// Inserts a clothing item directly through the repository
///
/// Sleeps briefly afterwards so consecutive items get distinct timestamps.
pub fn seed_item(pool: &DbPool, new: NewClothingItem) -> ClothingItemView {
    let view = repo::create_clothing_item(pool, new, &[]).unwrap();
    std::thread::sleep(Duration::from_millis(3));
    view
}

/// Sends a request and returns the status and JSON body (`Null` for an empty body)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub const BOUNDARY: &str = "wardrobo-test-boundary";

/// One part of a multipart form
pub enum FormPart<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8] },
}

/// Encodes a multipart/form-data body with [`BOUNDARY`]
pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                );
            }
            FormPart::File { name, file_name, content_type, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, parts: &[FormPart<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

/// A stand-in for the hosted model API
pub struct MockAi {
    /// Base URL to point an `AiConfig` at, e.g. `http://127.0.0.1:1234/v1`
    pub base_url: String,
    /// Every request body received, in order
    pub requests: Arc<Mutex<Vec<Value>>>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn mock_completion(State(state): State<MockState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body);
    (state.status, Json(state.reply))
}

/// Serves `reply` with `status` for every `POST /v1/chat/completions`
pub async fn spawn_mock_ai(status: StatusCode, reply: Value) -> MockAi {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        reply,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(mock_completion))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAi {
        base_url: format!("http://{}/v1", addr),
        requests,
    }
}

/// A chat completion response whose message content is `content`
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}
