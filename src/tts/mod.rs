pub mod engine;
pub mod voice;
pub mod wav;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub use engine::{CoquiEngine, SynthesisEngine, SynthesisJob};
pub use voice::{ReferenceVoice, VoiceInfo};
pub use wav::Waveform;

#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("No reference samples found in {0}")]
    NoReferenceSamples(PathBuf),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Synthesis engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Synthesis engine produced no file at {0}")]
    MissingOutput(PathBuf),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Shared handle to the voice-cloning model.
///
/// Every call goes through the engine mutex, so at most one inference runs
/// at a time no matter how many request handlers hold the cloner.
pub struct VoiceCloner {
    engine: Mutex<Box<dyn SynthesisEngine>>,
    voice: ReferenceVoice,
    language: String,
}

impl VoiceCloner {
    pub const DEFAULT_LANGUAGE: &'static str = "en";

    pub fn new(
        engine: Box<dyn SynthesisEngine>,
        voice: ReferenceVoice,
        language: impl Into<String>,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            voice,
            language: language.into(),
        }
    }

    pub fn voice(&self) -> &ReferenceVoice {
        &self.voice
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Synthesize `text` into an in-memory waveform.
    pub fn synthesize(&self, text: &str) -> Result<Waveform, SynthesisError> {
        let scratch = tempfile::Builder::new().prefix("voice-clone-").tempdir()?;
        let path = scratch.path().join("voice.wav");

        let mut engine = self.lock_engine();
        self.render(&mut **engine, text, &path)?;
        drop(engine);

        Waveform::open(&path)
    }

    /// Synthesize `text` into a WAV file at `path`, replacing whatever was there.
    pub fn synthesize_to_file(&self, text: &str, path: &Path) -> Result<(), SynthesisError> {
        let mut engine = self.lock_engine();
        self.render(&mut **engine, text, path)
    }

    /// Like [`synthesize_to_file`](Self::synthesize_to_file), returning the file
    /// contents. The engine stays locked until the file has been read back.
    pub fn synthesize_file_bytes(&self, text: &str, path: &Path) -> Result<Vec<u8>, SynthesisError> {
        let mut engine = self.lock_engine();
        self.render(&mut **engine, text, path)?;
        Ok(std::fs::read(path)?)
    }

    fn lock_engine(&self) -> MutexGuard<'_, Box<dyn SynthesisEngine>> {
        // Engines hold no per-call state, so a poisoned lock is still usable
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(
        &self,
        engine: &mut dyn SynthesisEngine,
        text: &str,
        path: &Path,
    ) -> Result<(), SynthesisError> {
        prepare_output(path)?;

        let job = SynthesisJob {
            text,
            speaker_wavs: &self.voice.samples,
            language: &self.language,
        };

        let start = Instant::now();
        engine.render(&job, path)?;
        tracing::info!(
            "Voice cloned in {} seconds",
            start.elapsed().as_secs_f64()
        );

        Ok(())
    }
}

/// Remove any previous output and make sure the parent directory exists.
fn prepare_output(path: &Path) -> Result<(), SynthesisError> {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed previous output at {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Writes a short tone whose length depends on the text, and records
    /// whether the previous output was already gone when it ran.
    struct ToneEngine {
        calls: Arc<AtomicUsize>,
        saw_stale_output: Arc<AtomicUsize>,
    }

    impl SynthesisEngine for ToneEngine {
        fn name(&self) -> &str {
            "tone"
        }

        fn render(&mut self, job: &SynthesisJob<'_>, out: &Path) -> Result<(), SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if out.exists() {
                self.saw_stale_output.fetch_add(1, Ordering::SeqCst);
            }
            assert_eq!(job.language, "en");
            assert_eq!(job.speaker_wavs.len(), 2);

            let samples = vec![0.25; job.text.len() * 10];
            let wav = Waveform::new(samples, 24000).to_wav_bytes()?;
            std::fs::write(out, wav)?;
            Ok(())
        }
    }

    struct BrokenEngine;

    impl SynthesisEngine for BrokenEngine {
        fn name(&self) -> &str {
            "broken"
        }

        fn render(&mut self, _job: &SynthesisJob<'_>, _out: &Path) -> Result<(), SynthesisError> {
            Err(SynthesisError::EngineFailed {
                status: "exit status: 1".into(),
                stderr: "CUDA out of memory".into(),
            })
        }
    }

    fn voice() -> ReferenceVoice {
        ReferenceVoice {
            name: "lele".into(),
            samples: vec!["voices/lele/1.wav".into(), "voices/lele/2.wav".into()],
        }
    }

    fn tone_cloner() -> (VoiceCloner, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stale = Arc::new(AtomicUsize::new(0));
        let engine = ToneEngine {
            calls: Arc::clone(&calls),
            saw_stale_output: Arc::clone(&stale),
        };
        (VoiceCloner::new(Box::new(engine), voice(), "en"), calls, stale)
    }

    #[test]
    fn test_synthesize_returns_waveform() {
        let (cloner, calls, _) = tone_cloner();
        let wave = cloner.synthesize("hello").unwrap();
        assert_eq!(wave.sample_rate, 24000);
        assert_eq!(wave.samples.len(), 50);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_synthesize_to_file_overwrites_previous_output() {
        let (cloner, calls, stale) = tone_cloner();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("voice.wav");

        cloner.synthesize_to_file("a much longer sentence", &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        cloner.synthesize_to_file("short", &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(stale.load(Ordering::SeqCst), 0);
        assert!(second.len() < first.len());
        assert_eq!(Waveform::open(&path).unwrap().samples.len(), 50);
    }

    #[test]
    fn test_same_text_lands_at_same_path() {
        let (cloner, _, _) = tone_cloner();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");

        let first = cloner.synthesize_file_bytes("same", &path).unwrap();
        let second = cloner.synthesize_file_bytes("same", &path).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let cloner = VoiceCloner::new(Box::new(BrokenEngine), voice(), "en");
        let result = cloner.synthesize("hello");
        assert!(matches!(result, Err(SynthesisError::EngineFailed { .. })));
    }

    #[test]
    fn test_failed_render_leaves_no_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        std::fs::write(&path, b"old audio").unwrap();

        let cloner = VoiceCloner::new(Box::new(BrokenEngine), voice(), "en");
        assert!(cloner.synthesize_to_file("hello", &path).is_err());
        assert!(!path.exists());
    }
}
