//! Gallery routes

use axum::{routing::get, Router};

use super::handlers;

pub fn gallery_routes() -> Router {
    Router::new().route("/", get(handlers::index))
}
