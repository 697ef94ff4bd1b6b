//! Audio capture, WAV container I/O, and sample-rate conversion.
//!
//! Microphone audio is captured via CPAL at the device rate, downmixed to
//! mono, and stored as 16-bit PCM WAV. Decoding normalizes everything to
//! mono f32 and resamples to 16kHz before it reaches Whisper.

/// Sample rate Whisper expects.
pub const TARGET_RATE: u32 = 16_000;

mod recorder;
mod resample;
#[cfg(test)]
mod tests;
pub mod wav;

pub use recorder::{Recorder, Recording, StopReason};

/// Convert mono samples at `source_rate` to the 16kHz Whisper contract.
pub fn to_whisper_rate(samples: &[f32], source_rate: u32) -> Vec<f32> {
    resample::to_target_rate(samples, source_rate)
}
