use crate::error::ApiError;
use image::{DynamicImage, GrayImage};
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    /// Binary (0/255) image ready for OCR
    pub image: GrayImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Grayscale, Gaussian blur, unsharp mask, fixed threshold.
///
/// The sequence and its constants are fixed; the same input always produces
/// the same output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, ApiError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let gray = self.run_step("grayscale", image, &mut steps_timing, steps::grayscale::apply)?;
        let blurred = self.run_step("blur", gray.clone(), &mut steps_timing, steps::blur::apply)?;
        let sharpened = self.run_step("sharpen", gray, &mut steps_timing, |img| {
            steps::sharpen::apply(img, &blurred)
        })?;
        let binary = self.run_step(
            "threshold",
            sharpened,
            &mut steps_timing,
            steps::threshold::apply,
        )?;

        let result = PreprocessingResult {
            image: binary.into_luma8(),
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        };

        let step_summary: Vec<String> = result
            .steps
            .iter()
            .map(|s| format!("{}={}ms", s.name, s.time_ms))
            .collect();
        tracing::debug!(
            "Preprocessed {}x{} image in {}ms ({})",
            result.image.width(),
            result.image.height(),
            result.total_time_ms,
            step_summary.join(", ")
        );

        Ok(result)
    }

    fn run_step<F>(
        &self,
        name: &'static str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, ApiError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, ApiError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name,
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
