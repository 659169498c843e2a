/// Wardrobo: a personal clothing catalog with AI search
///
/// This library provides the catalog data model, database access, the
/// hosted-model client used for prompt search and photo tagging, image
/// storage, and the web API.
///
/// ### Web API
///
/// - `GET /api/clothes`: List items, paginated and filtered
/// - `GET /api/clothes/{id}`: Get a single item
/// - `POST /api/ai/query`: Search with a natural-language prompt
/// - `POST /api/upload`: Upload a garment photo as a new item
/// - `GET /api/health`: Liveness check
/// - `GET /uploads/*`: Locally stored photos

/// Hosted model client and reply parsing
pub mod ai;

/// Layered configuration
pub mod config;

/// Database connection module
pub mod db;

/// Request and response shapes
pub mod dto;

/// API error type
pub mod errors;

/// Catalog filters
pub mod filters;

/// HTTP handlers
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Image storage
pub mod storage;

/// Tag normalisation
pub mod tags;

#[cfg(test)]
pub mod test_utils;

use anyhow::{anyhow, Context};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::ai::AiClient;
use crate::config::Config;
use crate::db::DbPool;
use crate::dto::PageSettings;
use crate::storage::ImageStore;

/// Room left in the request body limit for multipart framing and text fields
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Everything a handler needs, cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    /// `None` when no API key is configured
    pub ai: Option<AiClient>,
    pub storage: ImageStore,
    pub page_settings: PageSettings,
    pub max_upload_bytes: u64,
    /// Whether uploads are sent to the vision model
    pub auto_tag: bool,
}

impl AppState {
    /// Builds the state for a server running with `config`
    pub fn from_config(pool: Arc<DbPool>, config: &Config) -> anyhow::Result<Self> {
        let ai = config
            .ai_config()
            .map(|ai_config| AiClient::new(&ai_config))
            .transpose()
            .context("Failed to build AI client")?;
        let storage = ImageStore::from_config(config).context("Failed to set up image storage")?;

        Ok(Self {
            pool,
            ai,
            storage,
            page_settings: config.page_settings(),
            max_upload_bytes: config.max_upload_bytes,
            auto_tag: config.auto_tag,
        })
    }
}

/// Creates the application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let mut app = Router::new()
        // Catalog listing and lookup
        .route("/api/clothes", get(handlers::list_clothes_handler))
        .route("/api/clothes/{id}", get(handlers::get_clothing_item_handler))
        // Natural-language search
        .route("/api/ai/query", post(handlers::ai_query_handler))
        // Photo upload
        .route("/api/upload", post(handlers::upload_handler))
        .route("/api/health", get(handlers::health_handler));

    // Serve locally stored photos under their public prefix
    if let ImageStore::Local { dir, public_prefix } = &state.storage {
        if public_prefix.starts_with('/') && public_prefix.len() > 1 {
            info!("Serving {} at {}", dir.display(), public_prefix);
            app = app.nest_service(public_prefix, ServeDir::new(dir));
        }
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs all pending embedded migrations
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    if !applied.is_empty() {
        info!("Applied {} migrations", applied.len());
    }
    Ok(())
}
