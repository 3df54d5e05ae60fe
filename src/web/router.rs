//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    download_today, endpoint_not_found, get_file, health, home, list_files, upload_file, AppState,
};
use super::middleware::{create_cors_layer, security_headers};

/// Allowance on top of the upload limit for multipart boundaries and form fields.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(app_state.repository.max_upload_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/download", get(download_today).post(download_today))
        .route("/upload", post(upload_file))
        .route("/list-files", get(list_files))
        .route("/file/:file_type/*filepath", get(get_file))
        .route("/health", get(health));

    Router::new()
        .route("/", get(home))
        .nest("/api", api_routes)
        .fallback(endpoint_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}
