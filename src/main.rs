//! voicenote entrypoint.
//!
//! `voicenote` records from the microphone until Ctrl-C (or takes an existing
//! WAV file), transcribes it with a local Whisper model, prints the text, and
//! copies it to the clipboard. `--chunked` splits the audio on silence and
//! transcribes the chunks in order instead of feeding the model one file.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, warn};
use voicenote::audio::{wav, Recorder, StopReason};
use voicenote::config::AppConfig;
use voicenote::stt::Transcriber;
use voicenote::{clipboard, pipeline, telemetry};

/// Set by the SIGINT handler; polled by the capture loop.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_sigint_handler() -> Result<()> {
    unsafe {
        // SAFETY: the handler only flips an atomic flag, which is
        // async-signal-safe.
        let handler = handle_sigint as *const () as libc::sighandler_t;
        if libc::signal(libc::SIGINT, handler) == libc::SIG_ERR {
            return Err(anyhow!("failed to install SIGINT handler"));
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_sigint_handler() -> Result<()> {
    // No handler here; recording stops via --max-record-secs.
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(config.logs);

    if config.list_input_devices {
        for name in Recorder::list_devices()? {
            println!("{name}");
        }
        return Ok(());
    }

    let model_path = config
        .model_path
        .clone()
        .ok_or_else(|| anyhow!("--model-path is required"))?;
    let transcriber = Transcriber::new(&model_path, config.whisper_options())
        .with_context(|| format!("failed to load whisper model from {}", model_path.display()))?;

    // Keeps the scratch directory (and the recording inside it) alive until
    // transcription is done.
    let mut _scratch: Option<TempDir> = None;
    let audio_file: PathBuf = match &config.audio_file {
        Some(path) => path.clone(),
        None => {
            let (path, scratch) = record_to_wav(&config)?;
            _scratch = scratch;
            path
        }
    };

    let text = if config.chunked {
        let wave = wav::read_wav(&audio_file)?;
        pipeline::transcribe_chunked(&transcriber, &wave, &config.segmenter_config())?
    } else {
        pipeline::transcribe_file(&transcriber, &audio_file)?
    };

    if text.trim().is_empty() {
        eprintln!("No speech detected.");
        return Ok(());
    }
    println!("{text}");

    if !config.no_clipboard {
        // Clipboard trouble is worth a warning, never a failed run: the
        // transcript is already on stdout.
        match clipboard::publish(&text) {
            Ok(()) => eprintln!("Transcript copied to clipboard."),
            Err(err) => {
                warn!("clipboard publish failed: {err:#}");
                eprintln!("warning: could not copy to clipboard: {err:#}");
            }
        }
    }

    Ok(())
}

/// Record until Ctrl-C (or the hard limit) and flush the capture to a WAV.
///
/// Without `--save-audio` the file lands in a per-run scratch directory that
/// is removed when the run ends, on success and error alike.
fn record_to_wav(config: &AppConfig) -> Result<(PathBuf, Option<TempDir>)> {
    install_sigint_handler()?;
    let recorder = Recorder::new(config.input_device.as_deref())?;
    eprintln!(
        "Recording from '{}'... press Ctrl-C to stop.",
        recorder.device_name()
    );

    let max_duration =
        (config.max_record_secs > 0).then(|| Duration::from_secs(config.max_record_secs));
    let recording = recorder.record_until(&INTERRUPTED, config.capture_rate, max_duration)?;
    if recording.metrics.stop_reason == StopReason::MaxDuration {
        eprintln!("Reached the recording limit.");
    }
    eprintln!("Finished recording ({} ms).", recording.metrics.capture_ms);

    let (path, scratch) = match &config.save_audio {
        Some(path) => (path.clone(), None),
        None => {
            let dir = tempfile::Builder::new()
                .prefix("voicenote-")
                .tempdir()
                .context("failed to create scratch directory")?;
            (dir.path().join("recording.wav"), Some(dir))
        }
    };
    wav::write_wav_i16(&path, &recording.samples, recording.sample_rate)?;
    debug!(
        path = %path.display(),
        samples = recording.samples.len(),
        sample_rate = recording.sample_rate,
        "capture written"
    );
    Ok((path, scratch))
}
