// src/main.rs
use anyhow::Context;
use axum::{extract::DefaultBodyLimit, middleware, routing::get, Extension, Json, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod gallery;
mod images;
mod logging_middleware;
mod services;

use common::AppState;
use images::store::ImageStore;
use services::{stability, GoogleService, StabilityService};

/// Body limit for the JSON API; prompts are small, this is headroom.
const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://text2img.db".to_string());
    let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());

    // The session signing key is the sole integrity boundary; refuse to start
    // without one rather than fall back to a known default.
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let stability_api_key = env::var("STABILITY_API_KEY").ok();
    let stability_engine =
        env::var("STABILITY_ENGINE").unwrap_or_else(|_| stability::DEFAULT_ENGINE.to_string());
    let google_client_id = env::var("GOOGLE_CLIENT_ID").ok();
    let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").ok();
    let google_callback_url = env::var("GOOGLE_CALLBACK_URL")
        .unwrap_or_else(|_| "http://localhost:5000/api/auth/google/callback".to_string());
    let client_origins =
        env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    // First configured origin is where the OAuth callback sends the browser
    let client_origin = client_origins
        .split(',')
        .next()
        .unwrap_or("http://localhost:5173")
        .trim()
        .to_string();

    if stability_api_key.is_none() {
        tracing::warn!("STABILITY_API_KEY not set; generation requests will fail until configured");
    }

    // ========================================================================
    // DIRECTORY SETUP
    // ========================================================================

    tokio::fs::create_dir_all(&uploads_dir).await?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let store = Arc::new(ImageStore::new(pool.clone()));

    let google_service = Arc::new(GoogleService::new(
        google_client_id,
        google_client_secret,
        google_callback_url,
    ));
    info!("GoogleService initialized");

    let stability_service = Arc::new(StabilityService::new(stability_api_key, stability_engine));
    info!(engine = %stability_service.engine(), "StabilityService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        store,
        uploads_dir: PathBuf::from(uploads_dir),
        jwt_secret,
        client_origin,
        google_service,
        stability_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .route("/api/health", get(health_handler))
        .merge(auth::auth_routes())
        .merge(images::images_routes())
        .merge(gallery::gallery_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_body))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(Extension(shared))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = client_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// GET /api/health
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
