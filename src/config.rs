use crate::correction::CorrectionConfig;
use crate::engines::tesseract::TesseractConfig;
use crate::Args;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub tesseract: TesseractConfig,
    pub correction: CorrectionConfig,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut correction = match args.xai_api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => CorrectionConfig::with_api_key(key),
            None => CorrectionConfig::default(),
        };
        correction.enabled &= !args.disable_correction;
        correction.endpoint = args.correction_endpoint;
        correction.model = args.correction_model;
        correction.timeout = args.correction_timeout_secs.map(Duration::from_secs);

        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            tesseract: TesseractConfig {
                command: args.tesseract_cmd,
                language: args.language,
                page_seg_mode: args.page_seg_mode,
            },
            correction,
        }
    }
}
