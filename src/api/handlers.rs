use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use super::{FileResponse, HealthResponse, SynthesisRequest};
use crate::api::routes::AppState;
use crate::error::AppError;

/// Synthesize the request text into the configured output file and send it
/// back as a WAV attachment.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesisRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let text = extract_text(payload)?;
    tracing::debug!("Generating voice file for {} chars", text.len());

    let worker_state = Arc::clone(&state);
    let wav = tokio::task::spawn_blocking(move || {
        worker_state
            .cloner
            .synthesize_file_bytes(&text, &worker_state.output_path)
    })
    .await??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", state.download_name),
            ),
        ],
        wav,
    )
        .into_response())
}

/// Synthesize the request text and return the WAV base64-encoded in JSON.
pub async fn generate_base64(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesisRequest>, JsonRejection>,
) -> Result<Json<FileResponse>, AppError> {
    let text = extract_text(payload)?;
    tracing::debug!("Generating base64 voice for {} chars", text.len());

    let waveform =
        tokio::task::spawn_blocking(move || state.cloner.synthesize(&text)).await??;

    tracing::debug!(
        "Encoding {:.2}s of audio at {} Hz",
        waveform.duration_secs(),
        waveform.sample_rate
    );
    let wav = waveform.to_wav_bytes()?;

    Ok(Json(FileResponse::new(STANDARD.encode(wav))))
}

pub async fn invalid_method(method: Method) -> AppError {
    AppError::InvalidMethod(method)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        voice: state.cloner.voice().info(),
        language: state.cloner.language().to_string(),
    })
}

fn extract_text(payload: Result<Json<SynthesisRequest>, JsonRejection>) -> Result<String, AppError> {
    match payload {
        Ok(Json(request)) => Ok(request.into_text()),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
