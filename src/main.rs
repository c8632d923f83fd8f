use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod correction;
mod engine;
mod engines;
mod error;
mod extract;
mod parser;
mod preprocessing;
mod record;
mod server;
mod upload;

#[derive(Parser, Debug)]
#[command(name = "mutcd-sign-ocr-server")]
#[command(about = "Extract MUTCD sign tabulations from scanned plan sheets")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "8000")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Tesseract executable to invoke
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: String,

    /// Tesseract language model (e.g., "eng")
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Tesseract page segmentation mode
    #[arg(long, env = "OCR_PAGE_SEG_MODE", default_value = "4")]
    pub page_seg_mode: u8,

    /// Bearer credential for the correction API (correction is skipped when unset)
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true)]
    pub xai_api_key: Option<String>,

    /// Chat-completion endpoint used for correction
    #[arg(
        long,
        env = "CORRECTION_ENDPOINT",
        default_value = correction::DEFAULT_ENDPOINT
    )]
    pub correction_endpoint: String,

    /// Model identifier sent to the correction endpoint
    #[arg(long, env = "CORRECTION_MODEL", default_value = correction::DEFAULT_MODEL)]
    pub correction_model: String,

    /// Request timeout for the correction call in seconds (no timeout when unset)
    #[arg(long, env = "CORRECTION_TIMEOUT_SECS")]
    pub correction_timeout_secs: Option<u64>,

    /// Skip the correction pass even when a credential is configured
    #[arg(long)]
    pub disable_correction: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before parsing so .env values reach the env-backed flags
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = config::Config::from(args);

    tracing::info!(
        "Starting mutcd-sign-ocr-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
