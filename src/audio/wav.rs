//! WAV container read/write via hound.
//!
//! The writer always emits mono 16-bit PCM at the rate the audio was captured
//! at. The reader accepts any standard PCM WAV (integer or float samples, any
//! channel count, any rate) and normalizes to mono f32 in [-1, 1].

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Decoded audio: mono f32 samples plus the rate they were stored at.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / u64::from(self.sample_rate)
    }
}

/// Read a PCM WAV file and normalize it to mono f32.
pub fn read_wav(path: &Path) -> Result<Waveform> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let mono = match spec.sample_format {
        SampleFormat::Float => downmix(
            reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("failed to decode float samples")?,
            channels,
            |s| s,
        ),
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!(
                    "unsupported bit depth {} in {}",
                    spec.bits_per_sample,
                    path.display()
                );
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            downmix(
                reader
                    .samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()
                    .context("failed to decode integer samples")?,
                channels,
                move |s| s as f32 / scale,
            )
        }
    };

    Ok(Waveform {
        samples: mono,
        sample_rate: spec.sample_rate,
    })
}

/// Write mono f32 samples as 16-bit PCM. A zero-length sample slice still
/// produces a valid (empty) container.
pub fn write_wav_i16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * i16::MAX as f32) as i16)
            .context("failed to write sample")?;
    }
    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}

fn downmix<T, F>(interleaved: Vec<T>, channels: usize, mut convert: F) -> Vec<f32>
where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        return interleaved.into_iter().map(convert).collect();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().map(|&s| convert(s)).sum::<f32>() / frame.len() as f32)
        .collect()
}
