use super::*;
use axum::{body::Bytes, extract::Path, http::HeaderMap, http::StatusCode, routing::put, Json, Router};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[test]
fn test_extension_for() {
    assert_eq!(extension_for("image/jpeg"), Some("jpg"));
    assert_eq!(extension_for("IMAGE/PNG"), Some("png"));
    assert_eq!(extension_for("image/webp; charset=binary"), Some("webp"));
    assert_eq!(extension_for("image/avif"), Some("avif"));
    assert_eq!(extension_for("text/plain"), None);
    assert_eq!(extension_for(""), None);
}

#[tokio::test]
async fn test_local_save_and_delete() {
    let dir = tempdir().unwrap();
    let store = ImageStore::local(dir.path().join("uploads"), "/uploads/");

    let url = store.save(b"fake png", "image/png").await.unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let file_name = url.trim_start_matches("/uploads/");
    let path = dir.path().join("uploads").join(file_name);
    assert_eq!(std::fs::read(&path).unwrap(), b"fake png");

    store.delete(&url).await;
    assert!(!path.exists());
}

#[tokio::test]
async fn test_local_save_rejects_unsupported_type() {
    let dir = tempdir().unwrap();
    let store = ImageStore::local(dir.path(), "/uploads");

    let result = store.save(b"hello", "text/plain").await;
    assert!(matches!(result, Err(StorageError::UnsupportedType(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_local_delete_ignores_foreign_urls() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep.png");
    std::fs::write(&keep, b"x").unwrap();
    let store = ImageStore::local(dir.path(), "/uploads");

    store.delete("https://cdn.example.com/keep.png").await;
    store.delete("/uploads/../keep.png").await;
    store.delete("/uploads/missing.png").await;

    assert!(keep.exists());
}

#[test]
fn test_from_config_prefers_blob_endpoint() {
    let mut config = crate::config::base_config(None);
    assert!(matches!(ImageStore::from_config(&config).unwrap(), ImageStore::Local { .. }));

    config.blob_endpoint = Some("https://blob.example.com/store/".to_string());
    match ImageStore::from_config(&config).unwrap() {
        ImageStore::Blob { endpoint, .. } => assert_eq!(endpoint, "https://blob.example.com/store"),
        other => panic!("expected blob store, got {:?}", other),
    }

    config.blob_endpoint = Some("   ".to_string());
    assert!(matches!(ImageStore::from_config(&config).unwrap(), ImageStore::Local { .. }));
}

type Received = Arc<Mutex<Vec<(String, Option<String>, usize)>>>;

/// Blob endpoint stand-in that records each PUT and answers with `response`
async fn spawn_blob_server(status: StatusCode, response: serde_json::Value) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let state = received.clone();
    let app = Router::new().route(
        "/store/{name}",
        put(move |Path(name): Path<String>, headers: HeaderMap, body: Bytes| {
            let state = state.clone();
            let response = response.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                state.lock().unwrap().push((name, auth, body.len()));
                (status, Json(response))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/store", addr), received)
}

#[tokio::test]
async fn test_blob_save_uses_returned_url() {
    let (endpoint, received) =
        spawn_blob_server(StatusCode::OK, json!({"url": "https://cdn.example.com/a.jpg"})).await;
    let store = ImageStore::blob(&endpoint, Some("secret".to_string())).unwrap();

    let url = store.save(b"jpeg bytes", "image/jpeg").await.unwrap();
    assert_eq!(url, "https://cdn.example.com/a.jpg");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].0.ends_with(".jpg"));
    assert_eq!(received[0].1.as_deref(), Some("Bearer secret"));
    assert_eq!(received[0].2, 10);
}

#[tokio::test]
async fn test_blob_save_falls_back_to_target_url() {
    let (endpoint, received) = spawn_blob_server(StatusCode::OK, json!({})).await;
    let store = ImageStore::blob(&endpoint, None).unwrap();

    let url = store.save(b"gif", "image/gif").await.unwrap();
    assert!(url.starts_with(&endpoint));
    assert!(url.ends_with(".gif"));
    assert_eq!(received.lock().unwrap()[0].1, None);
}

#[tokio::test]
async fn test_blob_save_reports_error_status() {
    let (endpoint, _) =
        spawn_blob_server(StatusCode::FORBIDDEN, json!({"error": "bad token"})).await;
    let store = ImageStore::blob(&endpoint, Some("wrong".to_string())).unwrap();

    match store.save(b"png", "image/png").await {
        Err(StorageError::Remote { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("bad token"));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blob_save_reports_unreachable_endpoint() {
    let store = ImageStore::blob("http://127.0.0.1:9/store", None).unwrap();
    let result = store.save(b"png", "image/png").await;
    assert!(matches!(result, Err(StorageError::Request(_))));
}
