use crate::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use proptest::prelude::*;
use serde_json::{json, Number, Value};
use std::sync::{Arc, Mutex};

/// Sets up a test database with migrations applied
///
/// Each call gets its own shared in-memory database. Plain ":memory:" would
/// give every pooled connection a separate database, so migrations run on
/// one connection would not be visible on the others.
pub fn setup_test_db() -> Arc<db::DbPool> {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create test pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Strings mixing arbitrary printable text with punctuation-heavy ASCII
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\PC*",
        "[ a-zA-Z0-9_:,.\\-/%'\"]{0,40}",
        Just(String::new()),
    ]
}

pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<f64>()
            .prop_map(Number::from_f64)
            .prop_filter("f64s must be parseable as numbers", |v| v.is_some())
            .prop_map(|s| Value::Number(s.unwrap())),
        ".*".prop_map(Value::String)
    ];

    leaf.prop_recursive(
        4,  // 4 levels deep
        64, // maximum size of 64 nodes
        8,  // up to 8 items per collection
        |inner| prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map(
                prop_oneof![
                    Just("category".to_string()),
                    Just("colors".to_string()),
                    Just("keywords".to_string()),
                    Just("tags".to_string()),
                    Just("minPrice".to_string()),
                    Just("maxPrice".to_string()),
                    ".*",
                ],
                inner,
                0..8
            )
            .prop_map(|map| Value::Object(map.into_iter().collect())),
        ])
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

pub fn ai_config(base_url: &str) -> config::AiConfig {
    config::AiConfig {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        text_model: "test-text-model".to_string(),
        vision_model: "test-vision-model".to_string(),
        timeout_secs: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_test_db_is_isolated() {
        let first = setup_test_db();
        let second = setup_test_db();

        repo::create_user(&first, "one@example.com", None).unwrap();

        assert!(repo::create_user(&second, "one@example.com", None).is_ok());
    }

    #[tokio::test]
    async fn test_mock_ai_records_requests() {
        let mock = spawn_mock_ai(StatusCode::OK, completion("{}")).await;
        let response = reqwest::Client::new()
            .post(format!("{}/chat/completions", mock.base_url))
            .json(&json!({"model": "m"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], "{}");
        assert_eq!(mock.requests.lock().unwrap()[0]["model"], "m");
    }
}
