//! OCR engine implementations

pub mod tesseract;

use crate::config::Config;
use crate::engine::OcrEngine;
use std::sync::Arc;

/// Build the engine described by the server configuration
pub fn from_config(config: &Config) -> Arc<dyn OcrEngine> {
    let engine = tesseract::TesseractEngine::new(config.tesseract.clone());

    match engine.version() {
        Some(version) => tracing::info!("Using {}", version),
        None => tracing::warn!(
            "`{}` is not runnable; /process-image will fail until Tesseract is installed",
            config.tesseract.command
        ),
    }

    Arc::new(engine)
}
