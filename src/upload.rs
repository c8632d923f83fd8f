//! Uploaded image validation and decoding

use crate::error::ApiError;
use axum::body::Bytes;
use image::DynamicImage;

/// An image file received in a `/process-image` request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    /// Reject anything that is not declared as `image/*`
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_content_type(&self.content_type)
    }

    /// Validate and decode into a color image
    pub fn decode(&self) -> Result<DynamicImage, ApiError> {
        self.validate()?;

        let img = image::load_from_memory(&self.data).map_err(|e| {
            tracing::warn!("Failed to decode {} upload: {}", self.content_type, e);
            ApiError::InvalidInput("Invalid image file".to_string())
        })?;

        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }
}

/// Only `image/*` uploads are accepted
pub fn validate_content_type(content_type: &str) -> Result<(), ApiError> {
    if !content_type.starts_with("image/") {
        tracing::warn!("Rejected upload with content type: {}", content_type);
        return Err(ApiError::InvalidInput("File must be an image".to_string()));
    }
    Ok(())
}
