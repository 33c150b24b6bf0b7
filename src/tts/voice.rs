use std::path::{Path, PathBuf};

use serde::Serialize;

use super::SynthesisError;

/// Bank of reference recordings the cloned voice is conditioned on.
#[derive(Debug, Clone)]
pub struct ReferenceVoice {
    pub name: String,
    pub samples: Vec<PathBuf>,
}

impl ReferenceVoice {
    /// Collect every `.wav` file under `<voices_dir>/<name>`, sorted by file name.
    pub fn load(voices_dir: &Path, name: &str) -> Result<Self, SynthesisError> {
        let dir = voices_dir.join(name);

        if !dir.is_dir() {
            return Err(SynthesisError::NoReferenceSamples(dir));
        }

        let mut samples = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_wav = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("wav"))
                .unwrap_or(false);

            if is_wav && path.is_file() {
                samples.push(path);
            }
        }

        if samples.is_empty() {
            return Err(SynthesisError::NoReferenceSamples(dir));
        }

        samples.sort();

        Ok(Self {
            name: name.to_string(),
            samples,
        })
    }

    pub fn info(&self) -> VoiceInfo {
        VoiceInfo {
            name: self.name.clone(),
            samples: self.samples.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceInfo {
    pub name: String,
    pub samples: usize,
}
