use super::recorder::{downmix_into, FrameBuffer};
use super::resample::{
    basic_resample, design_low_pass, downsampling_tap_count, low_pass_fir, resample_linear,
    to_target_rate,
};
use super::wav::{read_wav, write_wav_i16, Waveform};
use super::{to_whisper_rate, StopReason, TARGET_RATE};
use crossbeam_channel::bounded;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn downmixes_multi_channel_audio() {
    let mut buf = Vec::new();
    let samples = [1.0f32, -1.0, 0.5, 0.5];
    downmix_into(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf, vec![0.0, 0.5]);
}

#[test]
fn preserves_single_channel_audio() {
    let mut buf = Vec::new();
    let samples = [0.1f32, 0.2, 0.3];
    downmix_into(&mut buf, &samples, 1, |sample| sample);
    assert_eq!(buf, samples);
}

#[test]
fn downmix_averages_trailing_partial_frame() {
    let mut buf = Vec::new();
    let samples = [0.2f32, 0.4, 0.6];
    downmix_into(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf.len(), 2);
    assert!((buf[1] - 0.6).abs() < 1e-6);
}

#[test]
fn frame_buffer_emits_fixed_size_frames() {
    let (sender, receiver) = bounded(8);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut buffer = FrameBuffer::new(4, sender, dropped.clone());

    let data: Vec<f32> = (0..10).map(|i| i as f32).collect();
    buffer.push(&data, 1, |s| s);

    assert_eq!(receiver.try_recv().unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(receiver.try_recv().unwrap(), vec![4.0, 5.0, 6.0, 7.0]);
    // Two samples still pending, not yet a full frame.
    assert!(receiver.try_recv().is_err());
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[test]
fn frame_buffer_downmixes_before_framing() {
    let (sender, receiver) = bounded(8);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut buffer = FrameBuffer::new(2, sender, dropped);

    // Stereo pairs collapse to their average before frames are cut.
    buffer.push(&[0.0f32, 1.0, 1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, |s| s);

    assert_eq!(receiver.try_recv().unwrap(), vec![0.5, 0.5]);
    assert_eq!(receiver.try_recv().unwrap(), vec![0.5, 0.0]);
}

#[test]
fn frame_buffer_counts_dropped_frames_when_channel_full() {
    let (sender, receiver) = bounded(1);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut buffer = FrameBuffer::new(2, sender, dropped.clone());

    buffer.push(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], 1, |s| s);

    assert_eq!(receiver.try_recv().unwrap(), vec![1.0, 2.0]);
    assert_eq!(dropped.load(Ordering::Relaxed), 2);
}

#[test]
fn stop_reason_labels_are_stable() {
    assert_eq!(StopReason::Interrupt.label(), "interrupt");
    assert_eq!(StopReason::MaxDuration.label(), "max_duration");
    assert_eq!(StopReason::StreamClosed.label(), "stream_closed");
}

#[test]
fn resample_is_identity_at_target_rate() {
    let input = vec![0.1f32, 0.2, 0.3];
    assert_eq!(to_target_rate(&input, TARGET_RATE), input);
}

#[test]
fn resample_returns_empty_for_empty_input() {
    assert!(to_target_rate(&[], 48_000).is_empty());
}

#[test]
fn resample_shrinks_when_downsampling() {
    let input: Vec<f32> = (0..4_410).map(|i| (i as f32 * 0.01).sin()).collect();
    let output = to_target_rate(&input, 44_100);
    let expected = (input.len() as f64 * TARGET_RATE as f64 / 44_100f64).round() as usize;
    let diff = (output.len() as isize - expected as isize).unsigned_abs();
    assert!(diff <= 10, "expected ~{expected} samples, got {}", output.len());
}

#[test]
fn resample_grows_when_upsampling() {
    let input: Vec<f32> = (0..800).map(|i| (i as f32 * 0.05).cos()).collect();
    let output = to_target_rate(&input, 8_000);
    let expected = (input.len() as f64 * TARGET_RATE as f64 / 8_000f64).round() as usize;
    let diff = (output.len() as isize - expected as isize).unsigned_abs();
    assert!(diff <= 10, "expected ~{expected} samples, got {}", output.len());
}

#[test]
fn basic_resample_rejects_absurd_rates() {
    let input = vec![0.5f32; 100];
    // Out-of-range source rates pass through untouched.
    assert_eq!(basic_resample(&input, 100), input);
}

#[test]
fn resample_linear_scales_length() {
    let input = vec![0.0f32, 1.0, 2.0, 3.0];
    let result = resample_linear(&input, 0.5);
    assert!(result.len() < input.len());
    assert!((result.first().copied().unwrap_or_default() - 0.0).abs() < 1e-6);
}

#[test]
fn tap_count_is_odd_and_bounded() {
    for rate in [22_050u32, 44_100, 48_000, 96_000, 192_000] {
        let taps = downsampling_tap_count(rate);
        assert_eq!(taps % 2, 1, "tap count must be odd for {rate}");
        assert!(taps <= 129);
    }
}

#[test]
fn low_pass_preserves_dc() {
    let input = vec![0.5f32; 2_000];
    let filtered = low_pass_fir(&input, 44_100, downsampling_tap_count(44_100));
    // Away from the edges a DC signal passes through a unity-gain filter.
    let mid = filtered[filtered.len() / 2];
    assert!((mid - 0.5).abs() < 0.01, "got {mid}");
}

#[test]
fn low_pass_coefficients_sum_to_one() {
    let coeffs = design_low_pass(0.18, 33);
    let sum: f32 = coeffs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4);
}

#[test]
fn wav_round_trips_mono_i16() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let samples: Vec<f32> = (0..1_600)
        .map(|i| 0.5 * (2.0 * PI * 220.0 * i as f32 / 16_000.0).sin())
        .collect();
    write_wav_i16(&path, &samples, 16_000).unwrap();

    let wave = read_wav(&path).unwrap();
    assert_eq!(wave.sample_rate, 16_000);
    assert_eq!(wave.samples.len(), samples.len());
    // 16-bit quantization bounds the error.
    for (a, b) in wave.samples.iter().zip(&samples) {
        assert!((a - b).abs() < 2.0 / i16::MAX as f32);
    }
}

#[test]
fn zero_length_capture_still_writes_a_valid_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");
    write_wav_i16(&path, &[], 44_100).unwrap();

    let wave = read_wav(&path).unwrap();
    assert_eq!(wave.sample_rate, 44_100);
    assert!(wave.samples.is_empty());
    assert_eq!(wave.duration_ms(), 0);
}

#[test]
fn wav_writer_clamps_out_of_range_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hot.wav");
    write_wav_i16(&path, &[2.0, -2.0], 16_000).unwrap();

    let wave = read_wav(&path).unwrap();
    assert!(wave.samples[0] > 0.99 && wave.samples[0] <= 1.0);
    assert!(wave.samples[1] < -0.99 && wave.samples[1] >= -1.0);
}

#[test]
fn waveform_duration_is_rate_aware() {
    let wave = Waveform {
        samples: vec![0.0; 22_050],
        sample_rate: 44_100,
    };
    assert_eq!(wave.duration_ms(), 500);
}

#[test]
fn to_whisper_rate_matches_resampler() {
    let input: Vec<f32> = (0..441).map(|i| (i as f32 * 0.02).sin()).collect();
    assert_eq!(to_whisper_rate(&input, 44_100), to_target_rate(&input, 44_100));
}
