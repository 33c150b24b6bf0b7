use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::SynthesisError;

pub const DEFAULT_COMMAND: &str = "tts";
pub const DEFAULT_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// One request to the external model.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisJob<'a> {
    pub text: &'a str,
    pub speaker_wavs: &'a [PathBuf],
    pub language: &'a str,
}

/// Seam to the pretrained voice-cloning model.
///
/// `render` blocks until the model has written a WAV file to `out`.
/// Implementations may assume they are never called concurrently.
pub trait SynthesisEngine: Send {
    fn name(&self) -> &str;

    fn render(&mut self, job: &SynthesisJob<'_>, out: &Path) -> Result<(), SynthesisError>;
}

/// Drives the Coqui `tts` command line with an XTTS model.
#[derive(Debug, Clone)]
pub struct CoquiEngine {
    program: PathBuf,
    model: String,
}

impl CoquiEngine {
    pub fn new(program: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
        }
    }

    fn args(&self, job: &SynthesisJob<'_>, out: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--model_name".into(),
            self.model.clone().into(),
            "--text".into(),
            job.text.into(),
            "--speaker_wav".into(),
        ];
        args.extend(job.speaker_wavs.iter().map(|p| p.as_os_str().to_owned()));
        args.push("--language_idx".into());
        args.push(job.language.into());
        args.push("--out_path".into());
        args.push(out.as_os_str().to_owned());
        args
    }
}

impl Default for CoquiEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_MODEL)
    }
}

impl SynthesisEngine for CoquiEngine {
    fn name(&self) -> &str {
        &self.model
    }

    fn render(&mut self, job: &SynthesisJob<'_>, out: &Path) -> Result<(), SynthesisError> {
        tracing::debug!(
            "Running {} for {} chars with {} reference samples",
            self.program.display(),
            job.text.len(),
            job.speaker_wavs.len()
        );

        let output = Command::new(&self.program)
            .args(self.args(job, out))
            .output()
            .map_err(|e| SynthesisError::Spawn {
                program: self.program.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SynthesisError::EngineFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !out.is_file() {
            return Err(SynthesisError::MissingOutput(out.to_path_buf()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_carry_every_reference_sample() {
        let engine = CoquiEngine::default();
        let wavs = vec![PathBuf::from("voices/lele/1.wav"), PathBuf::from("voices/lele/2.wav")];
        let job = SynthesisJob {
            text: "Hello there",
            speaker_wavs: &wavs,
            language: "en",
        };

        let args = engine.args(&job, Path::new("out/voice.wav"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();

        assert_eq!(
            args,
            [
                "--model_name",
                DEFAULT_MODEL,
                "--text",
                "Hello there",
                "--speaker_wav",
                "voices/lele/1.wav",
                "voices/lele/2.wav",
                "--language_idx",
                "en",
                "--out_path",
                "out/voice.wav",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let mut engine = CoquiEngine::new("/nonexistent/bin/tts-for-tests", DEFAULT_MODEL);
        let wavs = vec![PathBuf::from("a.wav")];
        let job = SynthesisJob {
            text: "hi",
            speaker_wavs: &wavs,
            language: "en",
        };
        let dir = tempfile::tempdir().unwrap();

        let result = engine.render(&job, &dir.path().join("out.wav"));
        assert!(matches!(result, Err(SynthesisError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_reported() {
        let mut engine = CoquiEngine::new("false", DEFAULT_MODEL);
        let wavs = vec![PathBuf::from("a.wav")];
        let job = SynthesisJob {
            text: "hi",
            speaker_wavs: &wavs,
            language: "en",
        };
        let dir = tempfile::tempdir().unwrap();

        let result = engine.render(&job, &dir.path().join("out.wav"));
        assert!(matches!(result, Err(SynthesisError::EngineFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output_file() {
        let mut engine = CoquiEngine::new("true", DEFAULT_MODEL);
        let wavs = vec![PathBuf::from("a.wav")];
        let job = SynthesisJob {
            text: "hi",
            speaker_wavs: &wavs,
            language: "en",
        };
        let dir = tempfile::tempdir().unwrap();

        let result = engine.render(&job, &dir.path().join("out.wav"));
        assert!(matches!(result, Err(SynthesisError::MissingOutput(_))));
    }
}
