//! Image data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Guidance scale applied when the request omits cfgScale.
pub const DEFAULT_CFG_SCALE: f64 = 7.0;

/// Diffusion steps applied when the request omits steps.
pub const DEFAULT_STEPS: u32 = 30;

/// Edge length applied when the request omits width/height.
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Persisted image record. Serialized in the camelCase wire form the gallery
/// client renders (`cfgScale`, `fileName`, `createdAt`, ...).
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub steps: i64,
    pub cfg_scale: f64,
    pub seed: Option<i64>,
    pub width: i64,
    pub height: i64,
    pub file_name: String,
    pub url: String,
    pub created_at: Option<String>,
}

/// Fields for a new image row. The caller supplies the generated id so the
/// store stays a pure persistence layer.
#[derive(Debug)]
pub struct NewImage {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub steps: u32,
    pub cfg_scale: f64,
    pub seed: Option<i64>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub url: String,
}

/// POST /api/generate request body. Everything except the prompt is
/// optional; a JSON null seed decodes to None, matching a client that sends
/// `seed: null` for the empty field.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub cfg_scale: Option<f64>,
    pub steps: Option<u32>,
    pub seed: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
