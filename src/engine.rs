use crate::error::ApiError;
use image::{GrayImage, ImageFormat};
use std::path::Path;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in an image file
    fn process(&self, path: &Path) -> Result<String, ApiError>;
}

/// Run `engine` over an in-memory image.
///
/// Path-based engines need a file on disk, so the image is written to a
/// temporary PNG that is removed when this returns, whether OCR succeeded
/// or not.
pub fn recognize(engine: &dyn OcrEngine, image: &GrayImage) -> Result<String, ApiError> {
    let temp_file = tempfile::Builder::new()
        .prefix("mutcd-ocr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| ApiError::Internal(format!("Failed to create temp file: {}", e)))?;

    image
        .save_with_format(temp_file.path(), ImageFormat::Png)
        .map_err(|e| ApiError::Internal(format!("Failed to write temp file: {}", e)))?;

    tracing::debug!(
        "Running {} on {} ({}x{})",
        engine.name(),
        temp_file.path().display(),
        image.width(),
        image.height()
    );

    engine.process(temp_file.path())
}
