use crate::config::Config;
use crate::correction::CorrectionClient;
use crate::engines;
use crate::error::ApiError;
use crate::extract::SignExtractor;
use crate::record::SignRecord;
use crate::upload::{validate_content_type, UploadedImage};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<SignExtractor>,
    pub config: Arc<Config>,
}

/// Liveness response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub ocr_engine: String,
    pub ocr_engine_description: String,
    pub ocr_language: String,
    pub page_seg_mode: u8,
    pub correction_enabled: bool,
    pub correction_model: String,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = engines::from_config(&config);
    let corrector = CorrectionClient::new(config.correction.clone())?;
    if corrector.is_enabled() {
        tracing::info!("Correction enabled (model: {})", config.correction.model);
    } else {
        tracing::warn!(
            "Correction disabled ({}); returning raw OCR records",
            config.correction.inactive_reason().unwrap_or("inactive")
        );
    }

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        extractor: Arc::new(SignExtractor::new(engine, Arc::new(corrector))),
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Room for multipart boundaries, part headers and small extra fields
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handle_root))
        .route("/process-image", post(handle_process_image))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Extract sign records from an uploaded tabulation sheet
async fn handle_process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<SignRecord>>, ApiError> {
    let start = Instant::now();

    let mut upload: Option<UploadedImage> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", &state))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().map(|s| s.to_string());

        // Reject before buffering the body
        validate_content_type(&content_type)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data", &state))?;

        upload = Some(UploadedImage::new(data, content_type).with_file_name(file_name));
    }

    let upload = upload.ok_or(ApiError::MissingFile)?;

    if upload.data.len() > state.config.max_file_size {
        return Err(ApiError::ImageTooLarge {
            size: upload.data.len(),
            max: state.config.max_file_size,
        });
    }

    tracing::info!(
        "Processing {} ({}, {} bytes)",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.content_type,
        upload.data.len()
    );

    let records = state.extractor.extract(upload).await?;

    tracing::info!(
        "Extracted {} sign records in {}ms",
        records.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(records))
}

fn multipart_error(err: MultipartError, context: &str, state: &AppState) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BodyTooLarge {
            max: state.config.max_file_size,
        }
    } else {
        ApiError::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Liveness check
async fn handle_root() -> impl IntoResponse {
    Json(RootResponse {
        message: "MUTCD OCR API is running!",
    })
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.extractor.engine();
    let corrector = state.extractor.corrector();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_engine: engine.name().to_string(),
        ocr_engine_description: engine.description().to_string(),
        ocr_language: state.config.tesseract.language.clone(),
        page_seg_mode: state.config.tesseract.page_seg_mode,
        correction_enabled: corrector.is_enabled(),
        correction_model: corrector.config().model.clone(),
        max_file_size_bytes: state.config.max_file_size,
    })
}
