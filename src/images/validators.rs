//! Validation for generation requests

use super::models::{GenerateRequest, DEFAULT_DIMENSION};
use crate::common::{ValidationResult, Validator};

/// Square resolutions the provider engine accepts.
pub const SUPPORTED_RESOLUTIONS: [u32; 3] = [512, 768, 1024];

pub struct GenerateRequestValidator;

impl Validator<GenerateRequest> for GenerateRequestValidator {
    fn validate(&self, data: &GenerateRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match data.prompt.as_deref() {
            None | Some("") => result.add_error("prompt", "prompt is required"),
            Some(_) => {}
        }

        let width = data.width.unwrap_or(DEFAULT_DIMENSION);
        let height = data.height.unwrap_or(DEFAULT_DIMENSION);

        if width != height {
            result.add_error("width", "width and height must be equal");
        } else if !SUPPORTED_RESOLUTIONS.contains(&width) {
            result.add_error("width", "supported resolutions are 512, 768 and 1024");
        }

        result
    }
}
