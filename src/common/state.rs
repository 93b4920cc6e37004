// Application state shared across all modules

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::images::store::ImageStore;
use crate::services::{GoogleService, StabilityService};

/// Application state containing the database pool, the image store handle,
/// service clients and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<ImageStore>,
    pub uploads_dir: PathBuf,
    pub jwt_secret: String,
    /// First entry of CLIENT_ORIGIN; the post-login redirect target.
    pub client_origin: String,
    pub google_service: Arc<GoogleService>,
    pub stability_service: Arc<StabilityService>,
}
