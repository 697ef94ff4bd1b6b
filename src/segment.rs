//! Silence-based waveform segmentation.
//!
//! The waveform is classified in fixed-size analysis windows by RMS level in
//! dBFS. Runs of silent windows at least `min_silence_ms` long become split
//! points; the spans between split points are the segments. Spans without a
//! single non-silent window are discarded, so an all-silence waveform yields
//! zero segments and the chunk pipeline treats that as an empty transcript.

/// Parameters for silence detection.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum silence run that splits the waveform (milliseconds).
    pub min_silence_ms: u64,
    /// Windows whose RMS stays below this level count as silence (dBFS).
    pub threshold_db: f32,
    /// Analysis window size (milliseconds).
    pub frame_ms: u64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 500,
            threshold_db: -40.0,
            frame_ms: 20,
        }
    }
}

/// Contiguous non-silent sub-range of a waveform, in sample indices
/// (`end` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn slice<'a>(&self, samples: &'a [f32]) -> &'a [f32] {
        &samples[self.start..self.end]
    }

    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        (self.end.saturating_sub(self.start) as u64 * 1000) / u64::from(sample_rate)
    }
}

/// Split a mono waveform into ordered non-silent segments.
///
/// A waveform with no qualifying silence run comes back as one segment equal
/// to the whole input; a waveform that is silence throughout comes back
/// empty.
pub fn split_on_silence(samples: &[f32], sample_rate: u32, cfg: &SegmenterConfig) -> Vec<Segment> {
    if samples.is_empty() || sample_rate == 0 {
        return Vec::new();
    }

    let window_samples = ((u64::from(sample_rate) * cfg.frame_ms) / 1000).max(1) as usize;
    let silent: Vec<bool> = samples
        .chunks(window_samples)
        .map(|window| rms_db(window) < cfg.threshold_db)
        .collect();

    // A silence run must span at least this many whole windows to split.
    let min_run = cfg.min_silence_ms.div_ceil(cfg.frame_ms.max(1)).max(1) as usize;

    let mut segments = Vec::new();
    let mut span_start = 0usize; // window index of the current candidate span
    let mut run_start = None::<usize>; // start of the current silence run
    let mut span_has_speech = false;

    for (i, &is_silent) in silent.iter().enumerate() {
        if is_silent {
            run_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = run_start.take() {
            if i - start >= min_run {
                // Qualifying silence run: close the span before it.
                if span_has_speech {
                    segments.push(window_span(span_start, start, window_samples, samples.len()));
                }
                span_start = i;
                span_has_speech = false;
            }
        }
        span_has_speech = true;
    }

    // Trailing portion: a qualifying silence tail is excluded from the final
    // span, a short one is kept with it.
    let span_end = match run_start {
        Some(start) if silent.len() - start >= min_run => start,
        _ => silent.len(),
    };
    if span_has_speech && span_end > span_start {
        segments.push(window_span(
            span_start,
            span_end,
            window_samples,
            samples.len(),
        ));
    }

    segments
}

fn window_span(start_win: usize, end_win: usize, window_samples: usize, total: usize) -> Segment {
    Segment {
        start: (start_win * window_samples).min(total),
        end: (end_win * window_samples).min(total),
    }
}

/// RMS level in dBFS, floored at -120 for digital silence.
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return -120.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let rms = energy.sqrt().max(1e-6);
    20.0 * rms.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const RATE: u32 = 16_000;

    fn tone(duration_ms: u64, amplitude: f32) -> Vec<f32> {
        let len = (u64::from(RATE) * duration_ms / 1000) as usize;
        (0..len)
            .map(|i| amplitude * (2.0 * PI * 440.0 * i as f32 / RATE as f32).sin())
            .collect()
    }

    fn silence(duration_ms: u64) -> Vec<f32> {
        vec![0.0; (u64::from(RATE) * duration_ms / 1000) as usize]
    }

    #[test]
    fn waveform_without_silence_is_one_segment() {
        let samples = tone(1_000, 0.5);
        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], Segment { start: 0, end: samples.len() });
        assert_eq!(segments[0].slice(&samples), &samples[..]);
    }

    #[test]
    fn all_silence_yields_zero_segments() {
        let samples = silence(2_000);
        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn quiet_noise_below_threshold_counts_as_silence() {
        // ~-66 dBFS, well under the -40 default.
        let samples = tone(2_000, 0.0007);
        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn empty_input_yields_zero_segments() {
        assert!(split_on_silence(&[], RATE, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn speech_silence_speech_splits_into_two() {
        let mut samples = tone(2_000, 0.5);
        let speech_len = samples.len();
        samples.extend(silence(1_000));
        let silence_end = samples.len();
        samples.extend(tone(2_000, 0.5));

        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert_eq!(segments.len(), 2);
        // First segment covers the leading speech, second the trailing speech;
        // neither includes the full silence gap.
        assert_eq!(segments[0].start, 0);
        assert!(segments[0].end >= speech_len && segments[0].end < silence_end);
        assert!(segments[1].start >= speech_len && segments[1].start <= silence_end);
        assert_eq!(segments[1].end, samples.len());
        assert!(segments[0].end <= segments[1].start, "segments must not overlap");
    }

    #[test]
    fn short_silence_does_not_split() {
        let mut samples = tone(1_000, 0.5);
        samples.extend(silence(300));
        samples.extend(tone(1_000, 0.5));

        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], Segment { start: 0, end: samples.len() });
    }

    #[test]
    fn leading_and_trailing_silence_are_trimmed_from_spans() {
        let mut samples = silence(1_000);
        let lead = samples.len();
        samples.extend(tone(1_000, 0.5));
        let speech_end = samples.len();
        samples.extend(silence(1_000));

        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert_eq!(segments.len(), 1);
        assert!(segments[0].start >= lead.saturating_sub(1024));
        assert!(segments[0].end >= speech_end && segments[0].end < samples.len());
    }

    #[test]
    fn segment_order_is_increasing() {
        let mut samples = Vec::new();
        for _ in 0..3 {
            samples.extend(tone(800, 0.5));
            samples.extend(silence(700));
        }
        let segments = split_on_silence(&samples, RATE, &SegmenterConfig::default());
        assert_eq!(segments.len(), 3);
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn rms_db_of_full_scale_square_is_zero() {
        let samples = vec![1.0f32; 512];
        assert!(rms_db(&samples).abs() < 0.01);
    }

    #[test]
    fn rms_db_floors_on_digital_silence() {
        assert_eq!(rms_db(&[0.0; 256]), -120.0);
        assert_eq!(rms_db(&[]), -120.0);
    }
}
