// src/images/handlers.rs
//! Generation pipeline and gallery queries

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{
    GenerateRequest, Image, NewImage, DEFAULT_CFG_SCALE, DEFAULT_DIMENSION, DEFAULT_STEPS,
};
use super::validators::GenerateRequestValidator;
use crate::auth::AuthedUser;
use crate::common::{generate_image_id, safe_email_log, ApiError, AppState, Validator};
use crate::services::stability::{StabilityError, TextPrompt, TextToImageRequest};

/// POST /api/generate
/// Validates the request, performs one synchronous provider call, writes the
/// PNG to the uploads directory and persists the record.
///
/// The provider is never invoked for invalid input, and a provider failure
/// surfaces its status code and message to the caller unchanged. There is no
/// retry and no rollback: a file written before a failed insert is left
/// behind (accepted inconsistency window).
pub async fn generate_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<Image>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = GenerateRequestValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Validated non-empty above
    let prompt = payload.prompt.unwrap_or_default();
    let cfg_scale = payload.cfg_scale.unwrap_or(DEFAULT_CFG_SCALE);
    let steps = payload.steps.unwrap_or(DEFAULT_STEPS);
    let width = payload.width.unwrap_or(DEFAULT_DIMENSION);
    let height = payload.height.unwrap_or(DEFAULT_DIMENSION);

    info!(
        user_id = %authed.id,
        email = %safe_email_log(&authed.email),
        steps,
        cfg_scale,
        width,
        height,
        has_seed = payload.seed.is_some(),
        "Generation request accepted"
    );

    let request = TextToImageRequest {
        text_prompts: vec![TextPrompt {
            text: prompt.clone(),
        }],
        cfg_scale,
        height,
        width,
        steps,
        seed: payload.seed,
    };

    let png = state
        .stability_service
        .text_to_image(&request)
        .await
        .map_err(|e| match e {
            StabilityError::NotConfigured => {
                ApiError::InternalServer("Missing STABILITY_API_KEY".to_string())
            }
            StabilityError::Upstream { status, message } => {
                ApiError::Provider { status, message }
            }
            other => ApiError::InternalServer(other.to_string()),
        })?;

    // Microsecond timestamp keeps concurrent requests from colliding on a name
    let file_name = format!("img_{}.png", Utc::now().timestamp_micros());
    let file_path = state.uploads_dir.join(&file_name);

    tokio::fs::write(&file_path, &png).await.map_err(|e| {
        error!(error = %e, file_path = %file_path.display(), "Failed to save generated image");
        ApiError::InternalServer("Failed to save generated image".to_string())
    })?;

    let record = state
        .store
        .create(NewImage {
            id: generate_image_id(),
            user_id: authed.id.clone(),
            prompt,
            steps,
            cfg_scale,
            seed: payload.seed,
            width,
            height,
            url: format!("/uploads/{}", file_name),
            file_name,
        })
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        image_id = %record.id,
        file_name = %record.file_name,
        "Image generated and stored"
    );

    Ok(Json(record))
}

/// GET /api/images
/// The caller's generations, newest first.
pub async fn list_images(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Image>>, ApiError> {
    let state = state_lock.read().await.clone();

    let images = state
        .store
        .list_by_user(&authed.id)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(images))
}

/// GET /uploads/:filename - Serve stored image bytes
pub async fn serve_upload(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    // Sanitize filename to prevent path traversal
    let safe_filename = sanitize_filename(&filename);
    let file_path = state.uploads_dir.join(&safe_filename);

    if !file_path.exists() {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }

    let content = tokio::fs::read(&file_path).await.map_err(|e| {
        error!(error = %e, file_path = %file_path.display(), "Failed to read image file");
        ApiError::InternalServer("Failed to read image".to_string())
    })?;

    let content_type = get_content_type_from_extension(&safe_filename);

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", content_type),
            ("Cache-Control", "public, max-age=31536000"),
        ],
        content,
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn sanitize_filename(filename: &str) -> String {
    // Remove path traversal sequences and directory separators
    let cleaned = filename
        .replace("..", "")
        .replace('/', "")
        .replace('\\', "")
        .replace('\0', "");

    // Whitelist safe characters: alphanumeric, dots, hyphens, underscores
    let sanitized: String = cleaned
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .collect();

    if sanitized.is_empty() {
        "sanitized_file".to_string()
    } else {
        sanitized
    }
}

fn get_content_type_from_extension(filename: &str) -> &'static str {
    match filename.split('.').last() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
