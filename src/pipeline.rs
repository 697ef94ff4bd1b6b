//! Direct and chunked transcription paths.
//!
//! Direct: hand the whole file to the model and return its text verbatim.
//! Chunked: split the waveform on silence, materialize each segment as a
//! numbered WAV in a per-run temporary directory, transcribe the files in
//! increasing numeric order, delete each one right after its transcription
//! completes, and join the texts with single spaces.

use crate::audio::wav::{self, Waveform};
use crate::segment::{split_on_silence, SegmenterConfig};
use crate::stt::SpeechToText;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Transcribe one audio file as a whole. The model's text comes back
/// verbatim.
pub fn transcribe_file(stt: &dyn SpeechToText, path: &Path) -> Result<String> {
    stt.transcribe_wav(path)
        .with_context(|| format!("transcription failed for {}", path.display()))
}

/// Transcribe a waveform segment by segment.
///
/// Zero segments (all-silence input) is an empty transcript, not an error.
/// The temporary segment directory is removed on every exit path; each
/// segment file is additionally deleted as soon as its own transcription
/// completes, so a failure partway through leaves only not-yet-processed
/// chunks for the directory cleanup to collect.
pub fn transcribe_chunked(
    stt: &dyn SpeechToText,
    wave: &Waveform,
    cfg: &SegmenterConfig,
) -> Result<String> {
    let segments = split_on_silence(&wave.samples, wave.sample_rate, cfg);
    debug!(
        segments = segments.len(),
        duration_ms = wave.duration_ms(),
        "silence segmentation complete"
    );
    if segments.is_empty() {
        return Ok(String::new());
    }

    let chunk_dir = tempfile::Builder::new()
        .prefix("voicenote-chunks-")
        .tempdir()
        .context("failed to create segment directory")?;

    let mut transcript = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let chunk_path = chunk_dir.path().join(format!("chunk_{index:03}.wav"));
        wav::write_wav_i16(&chunk_path, segment.slice(&wave.samples), wave.sample_rate)?;
        debug!(
            index,
            duration_ms = segment.duration_ms(wave.sample_rate),
            "transcribing segment"
        );

        let result = stt.transcribe_wav(&chunk_path);
        // The segment file only lives for the duration of its transcription
        // call, whether or not that call succeeded.
        if let Err(err) = fs::remove_file(&chunk_path) {
            debug!("failed to remove {}: {err}", chunk_path.display());
        }
        let text = result.with_context(|| format!("transcription failed for segment {index}"))?;

        let cleaned = clean_transcript(&text);
        if !cleaned.is_empty() {
            transcript.push_str(&cleaned);
            transcript.push(' ');
        }
    }

    Ok(transcript.trim().to_string())
}

/// Collapse whitespace and strip Whisper's non-speech markers
/// (`[silence]`, `(noise)`, and friends).
pub fn clean_transcript(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    static NON_SPEECH_RE: OnceLock<Regex> = OnceLock::new();
    let re = NON_SPEECH_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\[\s*\]|\(\s*\)|\[(?:\s*(?:silence|noise|inaudible|blank_audio|blank audio|music|laughter|applause|cough|breath(?:ing)?|wind|background)\s*)\]|\((?:\s*(?:silence|noise|inaudible|blank audio|music|laughter|applause|cough|breath(?:ing)?|wind|background|wind blowing)\s*)\)",
        )
        .expect("non-speech regex should compile")
    });
    let without_markers = re.replace_all(trimmed, " ");
    without_markers
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
