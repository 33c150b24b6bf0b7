use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::tts::engine::{DEFAULT_COMMAND, DEFAULT_MODEL};
use crate::tts::VoiceCloner;

pub const DEFAULT_PORT: u16 = 5050;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("PORT must be a number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),
}

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub voices_dir: PathBuf,
    pub voice: String,
    pub language: String,
    pub output_path: PathBuf,
    pub tts_command: PathBuf,
    pub tts_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        // IPv6 hosts may come bracketed, as in "[::1]"
        let ip: IpAddr = host
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(host.clone()))?;

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            voices_dir: var("VOICES_DIR", "./voices").into(),
            voice: var("VOICE", "lele"),
            language: var("LANGUAGE", VoiceCloner::DEFAULT_LANGUAGE),
            output_path: var("OUTPUT_PATH", "./output/voice.wav").into(),
            tts_command: var("TTS_COMMAND", DEFAULT_COMMAND).into(),
            tts_model: var("TTS_MODEL", DEFAULT_MODEL),
        })
    }
}
