//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/auth/google` - Redirect to Google's consent page
/// - `GET /api/auth/google/callback` - OAuth callback, sets the session cookie
/// - `GET /api/auth/me` - Current session status
/// - `GET /api/auth/logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google", get(handlers::google_login))
        .route("/api/auth/google/callback", get(handlers::google_callback))
        .route("/api/auth/me", get(handlers::me_handler))
        .route("/api/auth/logout", get(handlers::logout_handler))
}
