use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::SynthesisError;

/// Mono audio produced by the voice cloner.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn open(path: &Path) -> Result<Self, SynthesisError> {
        let reader = WavReader::open(path)?;
        Self::decode(reader)
    }

    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, SynthesisError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        Self::decode(reader)
    }

    fn decode<R: Read>(mut reader: WavReader<R>) -> Result<Self, SynthesisError> {
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        // Only the first channel is kept for multi-channel input
        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .step_by(channels)
                .collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .step_by(channels)
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self::new(samples, spec.sample_rate))
    }

    /// Encode as mono 16-bit PCM WAV.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, SynthesisError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut buffer = Vec::new();
        {
            let cursor = Cursor::new(&mut buffer);
            let mut writer = WavWriter::new(cursor, spec)?;

            for sample in &self.samples {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled)?;
            }

            writer.finalize()?;
        }

        Ok(buffer)
    }
}
