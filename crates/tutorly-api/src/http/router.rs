//! Axum router configuration with middleware.
//!
//! Routes keep the trailing-slash paths the tutoring frontend calls.
//! Middleware: CORS (origins from `[server].cors_origins`) and request tracing.

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.server.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Chats
        .route(
            "/chats/",
            get(handlers::chat::list_chats).post(handlers::chat::create_chat),
        )
        .route(
            "/chats/{id}/messages/",
            get(handlers::chat::list_messages).delete(handlers::chat::clear_messages),
        )
        .route(
            "/chats/{id}/notes",
            get(handlers::chat::get_notes).put(handlers::chat::update_notes),
        )
        .route("/chats/{id}/title", put(handlers::chat::update_title))
        .route("/tags/", get(handlers::chat::list_tags))
        // Messages
        .route("/messages/", post(handlers::message::create_message))
        // Tutoring replies
        .route(
            "/generate-response/",
            post(handlers::generate::generate_response),
        )
        .route(
            "/generate-response/stream",
            post(handlers::generate::generate_response_stream),
        )
        // Taxonomy
        .route("/subjects/", get(handlers::taxonomy::list_subjects))
        .route("/subjects/{id}/topics/", get(handlers::taxonomy::list_topics))
        .route(
            "/classify-subject/",
            post(handlers::taxonomy::classify_subject),
        )
        .route("/classify-topic/", post(handlers::taxonomy::classify_topic))
        .route("/generate-title/", post(handlers::taxonomy::generate_title))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none (or `*`) are configured; otherwise the parseable ones.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return AllowOrigin::from(Any);
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(values)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
