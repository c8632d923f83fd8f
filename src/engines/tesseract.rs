//! Tesseract engine implementation
//!
//! Runs the `tesseract` command-line tool as a child process and reads the
//! recognized text from its stdout.

use crate::engine::OcrEngine;
use crate::error::ApiError;
use std::path::Path;
use std::process::Command;

/// Page segmentation mode 4: a single column of text of variable sizes
pub const DEFAULT_PAGE_SEG_MODE: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Executable name or path
    pub command: String,
    /// Language model passed with `-l`
    pub language: String,
    /// Layout analysis mode passed with `--psm`
    pub page_seg_mode: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
        }
    }
}

pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// First line of `tesseract --version`, or `None` if the binary can't run
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.config.command)
            .arg("--version")
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        // Older releases print the version banner on stderr
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        String::from_utf8_lossy(&text)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR command-line engine"
    }

    fn process(&self, path: &Path) -> Result<String, ApiError> {
        let output = Command::new(&self.config.command)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .args(["--psm", &self.config.page_seg_mode.to_string()])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ApiError::OcrFailure(format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::OcrFailure(
                format!("{} not found (install tesseract-ocr)", self.config.command),
            )),
            Err(e) => Err(ApiError::OcrFailure(format!(
                "failed to run {}: {}",
                self.config.command, e
            ))),
        }
    }
}
