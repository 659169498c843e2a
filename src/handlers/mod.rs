/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler extracts what it needs from the request, calls the
/// repository, model client or image store, and returns JSON.

mod clothes_handlers;
mod ai_handlers;
mod upload_handlers;

// Re-export all handlers
pub use clothes_handlers::*;
pub use ai_handlers::*;
pub use upload_handlers::*;

use axum::Json;
use serde_json::{json, Value};

/// Handler for `GET /api/health`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
