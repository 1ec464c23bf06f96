use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::uploads::dtos::MAX_UPLOAD_SIZE;
use crate::features::uploads::handlers;
use crate::features::uploads::services::UploadService;

/// Public route serving stored uploads
pub fn routes(service: Arc<UploadService>) -> Router {
    Router::new()
        .route("/api/uploads/{*filename}", get(handlers::serve_upload))
        .with_state(service)
}

/// Back-office upload routes
pub fn admin_routes(service: Arc<UploadService>) -> Router {
    Router::new()
        .route(
            "/api/admin/uploads",
            // Multipart framing needs headroom above the file limit
            post(handlers::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024)),
        )
        .route("/api/admin/uploads/{id}", delete(handlers::delete_upload))
        .with_state(service)
}
