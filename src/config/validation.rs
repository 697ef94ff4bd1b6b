use super::{
    AppConfig, CAPTURE_RATE_RANGE, MAX_BEAM_SIZE, MAX_RECORD_SECS_LIMIT, MIN_SILENCE_MS_RANGE,
    SEGMENT_FRAME_MS_RANGE, SILENCE_THRESHOLD_DB_RANGE,
};
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before any device or model is opened.
    pub fn validate(&mut self) -> Result<()> {
        let (min_sil_lo, min_sil_hi) = MIN_SILENCE_MS_RANGE;
        if !(min_sil_lo..=min_sil_hi).contains(&self.min_silence_ms) {
            bail!(
                "--min-silence-ms must be between {min_sil_lo} and {min_sil_hi}, got {}",
                self.min_silence_ms
            );
        }

        let (db_lo, db_hi) = SILENCE_THRESHOLD_DB_RANGE;
        if !(db_lo..=db_hi).contains(&self.silence_threshold_db)
            || !self.silence_threshold_db.is_finite()
        {
            bail!(
                "--silence-threshold-db must be between {db_lo} and {db_hi} dBFS, got {}",
                self.silence_threshold_db
            );
        }

        let (frame_lo, frame_hi) = SEGMENT_FRAME_MS_RANGE;
        if !(frame_lo..=frame_hi).contains(&self.segment_frame_ms) {
            bail!(
                "--segment-frame-ms must be between {frame_lo} and {frame_hi}, got {}",
                self.segment_frame_ms
            );
        }
        if self.segment_frame_ms > self.min_silence_ms {
            bail!(
                "--segment-frame-ms ({}) cannot exceed --min-silence-ms ({})",
                self.segment_frame_ms,
                self.min_silence_ms
            );
        }

        let (rate_lo, rate_hi) = CAPTURE_RATE_RANGE;
        if !(rate_lo..=rate_hi).contains(&self.capture_rate) {
            bail!(
                "--capture-rate must be between {rate_lo} and {rate_hi} Hz, got {}",
                self.capture_rate
            );
        }

        if self.max_record_secs > MAX_RECORD_SECS_LIMIT {
            bail!(
                "--max-record-secs must be at most {MAX_RECORD_SECS_LIMIT}, got {}",
                self.max_record_secs
            );
        }

        if self.whisper_beam_size > MAX_BEAM_SIZE {
            bail!(
                "--whisper-beam-size must be at most {MAX_BEAM_SIZE}, got {}",
                self.whisper_beam_size
            );
        }
        if !(0.0..=1.0).contains(&self.whisper_temperature) {
            bail!(
                "--whisper-temperature must be between 0.0 and 1.0, got {}",
                self.whisper_temperature
            );
        }

        if !valid_lang(&self.lang) {
            bail!(
                "--lang must be \"auto\" or a two-letter ISO 639-1 code, got {:?}",
                self.lang
            );
        }

        // Device listing needs no model; every other invocation does.
        if !self.list_input_devices {
            match &self.model_path {
                None => bail!("--model-path is required (or set VOICENOTE_MODEL)"),
                Some(path) if !path.is_file() => {
                    bail!("whisper model not found at {}", path.display())
                }
                Some(_) => {}
            }
        }

        if let Some(path) = &self.audio_file {
            if !path.is_file() {
                bail!("audio file not found at {}", path.display());
            }
        }

        Ok(())
    }
}

fn valid_lang(lang: &str) -> bool {
    lang.eq_ignore_ascii_case("auto")
        || (lang.len() == 2 && lang.chars().all(|c| c.is_ascii_lowercase()))
}
