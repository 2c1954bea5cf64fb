//! Router configuration for the depot Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::cors::create_cors_layer;
use super::handlers::{
    delete_file, delete_selected, download_file, download_selected, file_info, list_files,
    upload_files, view_file, AppState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_size: usize,
) -> Router {
    // Stored files are also reachable directly as static assets.
    let uploads_dir = app_state.store.root().to_path_buf();

    Router::new()
        .route("/upload", post(upload_files))
        .route("/files", get(list_files))
        .route("/file-info", get(file_info))
        .route("/download/:filename", get(download_file))
        .route("/view/:filename", get(view_file))
        .route("/delete/:filename", delete(delete_file))
        .route("/delete-selected", delete(delete_selected))
        .route("/download-selected", post(download_selected))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
