//! Axum router with middleware.
//!
//! All relay endpoints are POSTs under `/api/`. Middleware: permissive CORS
//! (the simulator page may be served from anywhere) and request tracing.
//! When a public directory is configured and exists, the simulator page
//! assets are served from it, with API routes taking priority.

use std::path::Path;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, public_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/get_token", post(handlers::token::get_token))
        .route("/api/analyze_tone", post(handlers::language::analyze_tone))
        .route("/api/translate", post(handlers::language::translate))
        .route(
            "/api/identifyLanguage",
            post(handlers::language::identify_language),
        )
        .route("/api/converse", post(handlers::converse::converse))
        .route("/api/see", post(handlers::vision::see))
        .route("/api/discovery/query", post(handlers::discovery::query))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(dir) = public_dir {
        if dir.exists() {
            let index = dir.join("index.html");
            router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
            tracing::info!(path = %dir.display(), "serving simulator page assets");
        } else {
            tracing::warn!(path = %dir.display(), "public directory does not exist; API only");
        }
    }

    router
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
