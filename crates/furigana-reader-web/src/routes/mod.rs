//! HTTP route handlers for the furigana reader API.
//!
//! Every route answers JSON except the preview, which returns an HTML fragment.
//! Failures use the `{"detail": ...}` body from `helpers::ApiError`.

mod library;
mod translate;
mod upload;
mod viewer;

pub use library::{
    create_document, create_folder, create_tag, delete_document, delete_folder, delete_tag,
    get_library, rename_folder, update_document, update_translations,
};
pub use translate::translate_texts;
pub use upload::upload_html;
pub use viewer::{get_document_html, get_preview};

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Upload limit for annotated HTML
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/translate", post(translate_texts))
        // Library
        .route("/api/library", get(get_library))
        .route("/api/library/folders", post(create_folder))
        .route(
            "/api/library/folders/{id}",
            patch(rename_folder).delete(delete_folder),
        )
        .route("/api/library/tags", post(create_tag))
        .route("/api/library/tags/{id}", delete(delete_tag))
        .route("/api/library/documents", post(create_document))
        .route(
            "/api/library/documents/{id}",
            patch(update_document).delete(delete_document),
        )
        .route("/api/library/documents/{id}/upload", post(upload_html))
        .route("/api/library/documents/{id}/html", get(get_document_html))
        .route("/api/library/documents/{id}/preview", get(get_preview))
        .route(
            "/api/library/documents/{id}/translations",
            patch(update_translations),
        )
        // Middleware
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
