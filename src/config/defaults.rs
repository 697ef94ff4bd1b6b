//! Default values and validation bounds shared by the CLI surface.

/// Silence shorter than this never splits the waveform (milliseconds).
pub const DEFAULT_MIN_SILENCE_MS: u64 = 500;

/// RMS level below which an analysis window counts as silence (dBFS).
pub const DEFAULT_SILENCE_THRESHOLD_DB: f32 = -40.0;

/// Analysis window used when classifying silence (milliseconds).
pub const DEFAULT_SEGMENT_FRAME_MS: u64 = 20;

/// Sample rate requested from the capture device (Hz).
pub const DEFAULT_CAPTURE_RATE: u32 = 44_100;

pub const MIN_SILENCE_MS_RANGE: (u64, u64) = (50, 10_000);
pub const SILENCE_THRESHOLD_DB_RANGE: (f32, f32) = (-120.0, 0.0);
pub const SEGMENT_FRAME_MS_RANGE: (u64, u64) = (5, 200);
pub const CAPTURE_RATE_RANGE: (u32, u32) = (8_000, 192_000);
pub const MAX_RECORD_SECS_LIMIT: u64 = 3_600;
pub const MAX_BEAM_SIZE: u32 = 8;
