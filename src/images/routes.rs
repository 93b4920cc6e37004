//! Image routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the images router
///
/// # Routes
/// - `POST /api/generate` - Generate an image from a prompt
/// - `GET /api/images` - List the caller's images, newest first
/// - `GET /uploads/:filename` - Serve stored image bytes
pub fn images_routes() -> Router {
    Router::new()
        .route("/api/generate", post(handlers::generate_image))
        .route("/api/images", get(handlers::list_images))
        .route("/uploads/:filename", get(handlers::serve_upload))
}
