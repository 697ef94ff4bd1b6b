//! Whisper speech-to-text integration.
//!
//! Wraps `whisper_rs` to provide a simple transcription API. The model is
//! loaded once at startup and reused for every segment.

use crate::audio;
use anyhow::Result;
use std::path::Path;

/// Decoding options passed through from the CLI.
#[derive(Debug, Clone)]
pub struct WhisperOptions {
    pub lang: String,
    pub beam_size: u32,
    pub temperature: f32,
}

impl Default for WhisperOptions {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            beam_size: 0,
            temperature: 0.0,
        }
    }
}

/// The transcription capability the pipeline depends on.
///
/// `transcribe_samples` takes 16kHz mono f32 PCM. `transcribe_wav` decodes a
/// WAV file at any rate, resamples, and delegates; the chunk pipeline calls
/// it on each materialized segment file.
pub trait SpeechToText {
    fn transcribe_samples(&self, samples: &[f32]) -> Result<String>;

    fn transcribe_wav(&self, path: &Path) -> Result<String> {
        let wave = audio::wav::read_wav(path)?;
        let samples = audio::to_whisper_rate(&wave.samples, wave.sample_rate);
        self.transcribe_samples(&samples)
    }
}

#[cfg(unix)]
mod platform {
    use super::{SpeechToText, WhisperOptions};
    use anyhow::{anyhow, Context, Result};
    use std::io;
    use std::os::raw::{c_char, c_uint, c_void};
    use std::os::unix::io::AsRawFd;
    use std::path::Path;
    use std::sync::Once;
    use tracing::debug;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    /// Points stderr at `/dev/null` until dropped. whisper.cpp prints its
    /// model banner straight to fd 2, bypassing the Rust logging layer.
    struct StderrGate {
        saved: libc::c_int,
        _null: std::fs::File,
    }

    impl StderrGate {
        fn closed() -> Result<Self> {
            let null = std::fs::OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .context("failed to open /dev/null")?;
            // SAFETY: fd 2 is always open in this process; the duplicate is
            // owned by the gate and restored in Drop.
            let saved = unsafe { libc::dup(2) };
            if saved < 0 {
                return Err(anyhow!(
                    "failed to save stderr: {}",
                    io::Error::last_os_error()
                ));
            }
            if unsafe { libc::dup2(null.as_raw_fd(), 2) } < 0 {
                unsafe { libc::close(saved) };
                return Err(anyhow!(
                    "failed to redirect stderr: {}",
                    io::Error::last_os_error()
                ));
            }
            Ok(Self { saved, _null: null })
        }
    }

    impl Drop for StderrGate {
        fn drop(&mut self) {
            // SAFETY: `saved` is the descriptor duplicated in `closed`.
            unsafe {
                libc::dup2(self.saved, 2);
                libc::close(self.saved);
            }
        }
    }

    /// Whisper model context. Create once and reuse; loading the GGML model
    /// is by far the most expensive step.
    pub struct Transcriber {
        ctx: WhisperContext,
        opts: WhisperOptions,
    }

    impl Transcriber {
        /// Loads the Whisper model from disk, keeping whisper.cpp's verbose
        /// initialization chatter off the terminal.
        pub fn new(model_path: &Path, opts: WhisperOptions) -> Result<Self> {
            install_whisper_log_silencer();

            let model = model_path
                .to_str()
                .ok_or_else(|| anyhow!("model path is not valid UTF-8"))?;
            let ctx = {
                let _quiet = StderrGate::closed()?;
                WhisperContext::new_with_params(model, WhisperContextParameters::default())
                    .context("failed to load whisper model")?
            };
            Ok(Self { ctx, opts })
        }

        fn decode_params(&self) -> FullParams<'_, '_> {
            let strategy = if self.opts.beam_size > 1 {
                SamplingStrategy::BeamSearch {
                    beam_size: self.opts.beam_size as i32,
                    patience: -1.0,
                }
            } else {
                SamplingStrategy::Greedy { best_of: 1 }
            };
            let mut params = FullParams::new(strategy);
            let auto_detect = self.opts.lang.eq_ignore_ascii_case("auto");
            params.set_language(if auto_detect { None } else { Some(&self.opts.lang) });
            params.set_detect_language(auto_detect);
            params.set_temperature(self.opts.temperature);
            // Cap threads so laptops don't max out all cores.
            params.set_n_threads(num_cpus::get().min(8) as i32);
            params.set_print_progress(false);
            params.set_print_timestamps(false);
            params.set_print_special(false);
            params.set_print_realtime(false);
            params.set_translate(false);
            params.set_token_timestamps(false);
            params
        }
    }

    impl SpeechToText for Transcriber {
        fn transcribe_samples(&self, samples: &[f32]) -> Result<String> {
            let mut state = self
                .ctx
                .create_state()
                .context("failed to create whisper state")?;
            state.full(self.decode_params(), samples)?;

            let num_segments = state.full_n_segments().unwrap_or_else(|err| {
                debug!("whisper failed to read segment count: {err}");
                0
            });
            // Whisper splits output into small segments; stitch them together.
            let mut transcript = String::new();
            for i in 0..num_segments.max(0) {
                match state.full_get_segment_text_lossy(i) {
                    Ok(text) => transcript.push_str(&text),
                    Err(err) => debug!("failed to read whisper segment {i}: {err}"),
                }
            }
            Ok(transcript.replace("[BLANK_AUDIO]", ""))
        }
    }

    fn install_whisper_log_silencer() {
        static INSTALL_LOG_CALLBACK: Once = Once::new();
        INSTALL_LOG_CALLBACK.call_once(|| unsafe {
            whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
        });
    }

    unsafe extern "C" fn whisper_log_callback(
        _level: c_uint,
        _text: *const c_char,
        _user_data: *mut c_void,
    ) {
        // Silence the default whisper.cpp logger.
    }
}

#[cfg(unix)]
pub use platform::Transcriber;

#[cfg(not(unix))]
mod platform {
    use super::{SpeechToText, WhisperOptions};
    use anyhow::{anyhow, Result};
    use std::path::Path;

    /// Stub for unsupported targets.
    pub struct Transcriber;

    impl Transcriber {
        pub fn new(_: &Path, _: WhisperOptions) -> Result<Self> {
            Err(anyhow!(
                "whisper transcription is currently supported only on Unix-like platforms"
            ))
        }
    }

    impl SpeechToText for Transcriber {
        fn transcribe_samples(&self, _: &[f32]) -> Result<String> {
            Err(anyhow!(
                "whisper transcription is currently supported only on Unix-like platforms"
            ))
        }
    }
}

#[cfg(not(unix))]
pub use platform::Transcriber;
