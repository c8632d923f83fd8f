//! The end-to-end sheet extraction pipeline
//!
//! decode → preprocess → OCR → parse → correct, strictly in sequence.

use crate::correction::{CorrectionClient, CorrectionError};
use crate::engine::{self, OcrEngine};
use crate::error::ApiError;
use crate::parser;
use crate::preprocessing::Pipeline;
use crate::record::SignRecord;
use crate::upload::UploadedImage;
use std::sync::Arc;

pub struct SignExtractor {
    preprocessor: Pipeline,
    engine: Arc<dyn OcrEngine>,
    corrector: Arc<CorrectionClient>,
}

impl SignExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, corrector: Arc<CorrectionClient>) -> Self {
        Self {
            preprocessor: Pipeline::new(),
            engine,
            corrector,
        }
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    pub fn corrector(&self) -> &CorrectionClient {
        &self.corrector
    }

    /// Run the whole pipeline for one uploaded sheet
    pub async fn extract(&self, upload: UploadedImage) -> Result<Vec<SignRecord>, ApiError> {
        let records = self.read_sheet(upload).await?;
        Ok(self.apply_correction(records).await)
    }

    /// Decode, preprocess, OCR and parse, without the correction pass
    pub async fn read_sheet(&self, upload: UploadedImage) -> Result<Vec<SignRecord>, ApiError> {
        // Cheap check up front so bad uploads never reach the blocking pool
        upload.validate()?;

        let preprocessor = self.preprocessor;
        let ocr = Arc::clone(&self.engine);

        let text = tokio::task::spawn_blocking(move || {
            let image = upload.decode()?;
            let processed = preprocessor.process(image)?;
            engine::recognize(ocr.as_ref(), &processed.image)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("OCR task failed: {}", e)))??;

        tracing::debug!("OCR result:\n{}", text);

        let records = parser::parse_tabulation(&text);
        tracing::info!(
            "Parsed {} records from {} OCR lines",
            records.len(),
            text.lines().count()
        );
        Ok(records)
    }

    /// Replace `records` with the corrected list, or return them untouched if
    /// correction is unavailable or fails.
    pub async fn apply_correction(&self, records: Vec<SignRecord>) -> Vec<SignRecord> {
        match self.corrector.correct(&records).await {
            Ok(corrected) => corrected,
            Err(CorrectionError::Disabled) => {
                tracing::warn!(
                    "Correction disabled ({}), returning raw OCR records",
                    self.corrector
                        .config()
                        .inactive_reason()
                        .unwrap_or("inactive")
                );
                records
            }
            Err(e) => {
                tracing::error!("Correction failed, returning raw OCR records: {}", e);
                records
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::correction::CorrectionConfig;
    use httpmock::prelude::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns canned text and counts how often it ran
    pub(crate) struct FakeEngine {
        pub text: String,
        pub calls: AtomicUsize,
    }

    impl FakeEngine {
        pub fn new(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: text.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn description(&self) -> &'static str {
            "canned OCR output"
        }

        fn process(&self, path: &Path) -> Result<String, ApiError> {
            assert!(path.exists());
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    pub(crate) const SHEET_TEXT: &str = "SIGN TABULATION\n\
        STD. NO. SIZE DESCRIPTION QUANTITY\n\
        M4-8 24x30x.080 REGULATORY SIGN 5\n\
        Ma-8 | 24 x 12 JCT, 3\n\
        R1-1 30 x 30 STOP\n";

    pub(crate) fn png_upload() -> UploadedImage {
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x % 7 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([235, 235, 235])
            }
        });
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        UploadedImage::new(buf, "image/png")
    }

    fn disabled_corrector() -> Arc<CorrectionClient> {
        Arc::new(CorrectionClient::new(CorrectionConfig::default()).unwrap())
    }

    fn raw_records() -> Vec<SignRecord> {
        parser::parse_tabulation(SHEET_TEXT)
    }

    #[tokio::test]
    async fn test_passthrough_without_credential() {
        let engine = FakeEngine::new(SHEET_TEXT);
        let extractor = SignExtractor::new(engine.clone(), disabled_corrector());

        let records = extractor.extract(png_upload()).await.unwrap();

        assert_eq!(records, raw_records());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].size, "24x30x.080");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_switched_off_correction_skips_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).body("[]");
            })
            .await;

        let config = CorrectionConfig {
            enabled: false,
            endpoint: server.url("/v1/chat/completions"),
            ..CorrectionConfig::with_api_key("test-key")
        };
        assert_eq!(config.inactive_reason(), Some("turned off by configuration"));
        let corrector = CorrectionClient::new(config).unwrap();
        let extractor = SignExtractor::new(FakeEngine::new(SHEET_TEXT), Arc::new(corrector));

        let records = extractor.extract(png_upload()).await.unwrap();

        assert_eq!(records, raw_records());
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_non_image_skips_ocr() {
        let engine = FakeEngine::new(SHEET_TEXT);
        let extractor = SignExtractor::new(engine.clone(), disabled_corrector());

        let upload = UploadedImage::new(b"%PDF-1.7".to_vec(), "application/pdf");
        let result = extractor.extract(upload).await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_undecodable_image_skips_ocr() {
        let engine = FakeEngine::new(SHEET_TEXT);
        let extractor = SignExtractor::new(engine.clone(), disabled_corrector());

        let upload = UploadedImage::new(b"not really a jpeg".to_vec(), "image/jpeg");
        let result = extractor.extract(upload).await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_correction_falls_back_to_raw() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("upstream exploded");
            })
            .await;

        let corrector = CorrectionClient::new(CorrectionConfig {
            endpoint: server.url("/v1/chat/completions"),
            ..CorrectionConfig::with_api_key("test-key")
        })
        .unwrap();
        let extractor = SignExtractor::new(FakeEngine::new(SHEET_TEXT), Arc::new(corrector));

        let records = extractor.extract(png_upload()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records, raw_records());
    }

    #[tokio::test]
    async fn test_garbled_completion_falls_back_to_raw() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"content": "[{\"code\": \"M4-8\"}]"}}]
                }));
            })
            .await;

        let corrector = CorrectionClient::new(CorrectionConfig {
            endpoint: server.url("/v1/chat/completions"),
            ..CorrectionConfig::with_api_key("test-key")
        })
        .unwrap();
        let extractor = SignExtractor::new(FakeEngine::new(SHEET_TEXT), Arc::new(corrector));

        let records = extractor.extract(png_upload()).await.unwrap();

        assert_eq!(records, raw_records());
    }

    #[tokio::test]
    async fn test_successful_correction_replaces_records() {
        let corrected = vec![SignRecord {
            code: "M4-8".to_string(),
            size: "24 x 30".to_string(),
            description: "Regulatory sign".to_string(),
            quantity: "5".to_string(),
        }];

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {
                        "content": serde_json::to_string(&corrected).unwrap()
                    }}]
                }));
            })
            .await;

        let corrector = CorrectionClient::new(CorrectionConfig {
            endpoint: server.url("/v1/chat/completions"),
            ..CorrectionConfig::with_api_key("test-key")
        })
        .unwrap();
        let extractor = SignExtractor::new(FakeEngine::new(SHEET_TEXT), Arc::new(corrector));

        let records = extractor.extract(png_upload()).await.unwrap();

        assert_eq!(records, corrected);
    }
}
