pub mod handlers;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::tts::VoiceInfo;

/// `{ "data": { "attributes": { "text": ... } } }`
#[derive(Debug, Deserialize)]
pub struct SynthesisRequest {
    pub data: RequestData,
}

#[derive(Debug, Deserialize)]
pub struct RequestData {
    pub attributes: RequestAttributes,
}

#[derive(Debug, Deserialize)]
pub struct RequestAttributes {
    pub text: String,
}

impl SynthesisRequest {
    pub fn into_text(self) -> String {
        self.data.attributes.text
    }
}

/// `{ "data": { "attributes": { "file": <base64 WAV> } } }`
#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub data: FileData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileData {
    pub attributes: FileAttributes,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileAttributes {
    pub file: String,
}

impl FileResponse {
    pub fn new(file: String) -> Self {
        Self {
            data: FileData {
                attributes: FileAttributes { file },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub voice: VoiceInfo,
    pub language: String,
}
