use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::tts::VoiceCloner;

pub const GENERATE_PATH: &str = "/integrations/voice-cloning/generate";
pub const GENERATE_BASE64_PATH: &str = "/integrations/voice-cloning/generate-base64";

pub struct AppState {
    pub cloner: VoiceCloner,
    /// Every `generate` request overwrites this file.
    pub output_path: PathBuf,
    pub download_name: String,
}

impl AppState {
    pub fn new(cloner: VoiceCloner, output_path: PathBuf) -> Self {
        let download_name = output_path
            .file_name()
            .map(|n| header_safe_file_name(&n.to_string_lossy()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "voice.wav".to_string());

        Self {
            cloner,
            output_path,
            download_name,
        }
    }
}

/// Replace anything that cannot sit inside a quoted `Content-Disposition`
/// filename (quotes, backslashes, control and non-ASCII characters) with `_`.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            GENERATE_PATH,
            post(handlers::generate).fallback(handlers::invalid_method),
        )
        .route(
            GENERATE_BASE64_PATH,
            post(handlers::generate_base64).fallback(handlers::invalid_method),
        )
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
