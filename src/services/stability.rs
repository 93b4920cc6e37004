// src/services/stability.rs
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

/// Engine used when STABILITY_ENGINE is not configured.
pub const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

/// Upper bound on one synchronous generation call.
const GENERATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum StabilityError {
    #[error("Missing STABILITY_API_KEY")]
    NotConfigured,

    /// Non-2xx answer from the provider; message is the upstream body text.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
pub struct TextPrompt {
    pub text: String,
}

/// Payload for the text-to-image endpoint. The seed field is omitted from
/// the serialized body when absent; the provider treats a missing seed as
/// "pick one at random" but rejects null.
#[derive(Debug, Serialize)]
pub struct TextToImageRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: f64,
    pub height: u32,
    pub width: u32,
    pub steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StabilityService {
    api_key: Option<String>,
    engine: String,
    base_url: String,
    client: Client,
}

impl StabilityService {
    pub fn new(api_key: Option<String>, engine: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            engine,
            base_url: "https://api.stability.ai".to_string(),
            client,
        }
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// One synchronous text-to-image call returning raw PNG bytes.
    ///
    /// Upstream HTTP failures come back as `Upstream` with the provider's
    /// status code and body text untouched, so handlers can pass both through
    /// to the caller.
    pub async fn text_to_image(
        &self,
        request: &TextToImageRequest,
    ) -> Result<Bytes, StabilityError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(StabilityError::NotConfigured)?;

        let url = format!(
            "{}/v1/generation/{}/text-to-image",
            self.base_url.trim_end_matches('/'),
            self.engine
        );

        debug!(
            engine = %self.engine,
            width = request.width,
            height = request.height,
            steps = request.steps,
            cfg_scale = request.cfg_scale,
            has_seed = request.seed.is_some(),
            "Sending text-to-image request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Accept", "image/png")
            .json(request)
            .send()
            .await
            .map_err(|e| StabilityError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %message, "Stability text-to-image request failed");
            return Err(StabilityError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StabilityError::InvalidResponse(e.to_string()))?;

        // The endpoint is asked for raw PNG; anything else means the provider
        // answered with an unexpected body.
        if infer::get(&bytes).map(|t| t.mime_type()) != Some("image/png") {
            return Err(StabilityError::InvalidResponse(
                "provider did not return a PNG image".to_string(),
            ));
        }

        info!(
            engine = %self.engine,
            bytes = bytes.len(),
            "Image generation completed"
        );

        Ok(bytes)
    }
}
