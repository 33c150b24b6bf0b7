use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_cloning_server::api::routes::{create_router, AppState};
use voice_cloning_server::config::Config;
use voice_cloning_server::tts::{CoquiEngine, ReferenceVoice, SynthesisEngine, VoiceCloner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Voice Cloning Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", config.addr);

    // Reference voice bank
    let voice = ReferenceVoice::load(&config.voices_dir, &config.voice)?;
    tracing::info!(
        "Reference voice '{}' with {} samples from {}",
        voice.name,
        voice.samples.len(),
        config.voices_dir.display()
    );

    let engine = CoquiEngine::new(&config.tts_command, &config.tts_model);
    tracing::info!(
        "Synthesis engine: {} ({}), language: {}",
        engine.name(),
        config.tts_command.display(),
        config.language
    );

    let cloner = VoiceCloner::new(Box::new(engine), voice, &config.language);
    tracing::info!("Output file: {}", config.output_path.display());

    let state = Arc::new(AppState::new(cloner, config.output_path.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
