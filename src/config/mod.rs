//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_CAPTURE_RATE, DEFAULT_MIN_SILENCE_MS, DEFAULT_SEGMENT_FRAME_MS,
    DEFAULT_SILENCE_THRESHOLD_DB,
};
use defaults::{
    CAPTURE_RATE_RANGE, MAX_BEAM_SIZE, MAX_RECORD_SECS_LIMIT, MIN_SILENCE_MS_RANGE,
    SEGMENT_FRAME_MS_RANGE, SILENCE_THRESHOLD_DB_RANGE,
};

use crate::segment::SegmenterConfig;
use crate::stt::WhisperOptions;

/// CLI options for voicenote. Validated values are what every component sees;
/// there is no ambient global state.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Record (or load) audio, transcribe it with Whisper, copy the text to the clipboard",
    author,
    version
)]
pub struct AppConfig {
    /// Existing WAV file to transcribe instead of recording from the microphone
    #[arg(value_name = "AUDIO_FILE")]
    pub audio_file: Option<PathBuf>,

    /// Split the audio on silence and transcribe the chunks in order
    #[arg(long)]
    pub chunked: bool,

    /// Minimum silence run that splits the waveform (milliseconds)
    #[arg(long = "min-silence-ms", default_value_t = DEFAULT_MIN_SILENCE_MS)]
    pub min_silence_ms: u64,

    /// Silence threshold relative to full scale (dBFS)
    #[arg(
        long = "silence-threshold-db",
        default_value_t = DEFAULT_SILENCE_THRESHOLD_DB,
        allow_hyphen_values = true
    )]
    pub silence_threshold_db: f32,

    /// Analysis window for silence classification (milliseconds)
    #[arg(long = "segment-frame-ms", default_value_t = DEFAULT_SEGMENT_FRAME_MS)]
    pub segment_frame_ms: u64,

    /// Path to the GGML Whisper model file
    #[arg(long = "model-path", env = "VOICENOTE_MODEL")]
    pub model_path: Option<PathBuf>,

    /// Language passed to Whisper ("auto" enables detection)
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Whisper beam size (>1 enables beam search)
    #[arg(long = "whisper-beam-size", default_value_t = 0)]
    pub whisper_beam_size: u32,

    /// Whisper sampling temperature
    #[arg(long = "whisper-temperature", default_value_t = 0.0)]
    pub whisper_temperature: f32,

    /// Preferred audio input device name
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Sample rate requested from the capture device (Hz)
    #[arg(long = "capture-rate", default_value_t = DEFAULT_CAPTURE_RATE)]
    pub capture_rate: u32,

    /// Hard stop for recording in seconds (0 means record until Ctrl-C)
    #[arg(long = "max-record-secs", default_value_t = 0)]
    pub max_record_secs: u64,

    /// Keep the captured WAV at this path instead of discarding it
    #[arg(long = "save-audio", value_name = "PATH")]
    pub save_audio: Option<PathBuf>,

    /// Print the transcript without touching the clipboard
    #[arg(long = "no-clipboard", default_value_t = false)]
    pub no_clipboard: bool,

    /// Enable diagnostic logging to stderr
    #[arg(long, env = "VOICENOTE_LOGS", default_value_t = false)]
    pub logs: bool,
}

impl AppConfig {
    /// Segmenter parameters derived from the validated CLI values.
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            min_silence_ms: self.min_silence_ms,
            threshold_db: self.silence_threshold_db,
            frame_ms: self.segment_frame_ms,
        }
    }

    /// Whisper decoding options derived from the validated CLI values.
    pub fn whisper_options(&self) -> WhisperOptions {
        WhisperOptions {
            lang: self.lang.clone(),
            beam_size: self.whisper_beam_size,
            temperature: self.whisper_temperature,
        }
    }
}
