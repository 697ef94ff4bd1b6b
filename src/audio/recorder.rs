//! System microphone recording via CPAL.
//!
//! The CPAL callback thread downmixes incoming buffers to mono and hands
//! fixed-size frames to the capture loop over a bounded channel. The loop
//! accumulates samples until the stop flag is raised (Ctrl-C) or an optional
//! hard duration limit is reached.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Samples per frame handed from the audio callback to the capture loop.
const FRAME_SAMPLES: usize = 512;

/// Pending frames between the callback thread and the capture loop.
const FRAME_CHANNEL_CAPACITY: usize = 64;

const RECV_WAIT: Duration = Duration::from_millis(100);

/// Why the capture loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    MaxDuration,
    StreamClosed,
}

impl StopReason {
    pub fn label(self) -> &'static str {
        match self {
            StopReason::Interrupt => "interrupt",
            StopReason::MaxDuration => "max_duration",
            StopReason::StreamClosed => "stream_closed",
        }
    }
}

/// Capture statistics logged after each recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetrics {
    pub capture_ms: u64,
    pub frames_processed: usize,
    pub frames_dropped: usize,
    pub stop_reason: StopReason,
}

/// A finished capture: mono f32 samples at `sample_rate`.
#[derive(Debug, Clone)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub metrics: CaptureMetrics,
}

/// Downmix an interleaved buffer to mono, appending to `out`. Partial frames
/// at the end of a callback buffer are averaged over the channels present.
pub(super) fn downmix_into<T, F>(out: &mut Vec<f32>, data: &[T], channels: usize, mut convert: F)
where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        out.extend(data.iter().copied().map(&mut convert));
        return;
    }
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().map(|&s| convert(s)).sum();
        out.push(sum / frame.len() as f32);
    }
}

/// Callback-side frame assembly: downmixes straight into the pending buffer
/// and ships [`FRAME_SAMPLES`]-sized frames over the channel. A full channel
/// means the capture loop fell behind; those frames are counted as dropped
/// rather than blocking the audio thread.
pub(super) struct FrameBuffer {
    frame_samples: usize,
    pending: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
}

impl FrameBuffer {
    pub(super) fn new(
        frame_samples: usize,
        sender: Sender<Vec<f32>>,
        dropped: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
            pending: Vec::with_capacity(frame_samples * 2),
            sender,
            dropped,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        downmix_into(&mut self.pending, data, channels, convert);
        while self.pending.len() >= self.frame_samples {
            let frame: Vec<f32> = self.pending.drain(..self.frame_samples).collect();
            match self.sender.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

/// Audio input device wrapper.
pub struct Recorder {
    device: cpal::Device,
}

impl Recorder {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        Ok(host
            .input_devices()
            .context("no input devices available")?
            .filter_map(|device| device.name().ok())
            .collect())
    }

    /// Create a recorder, optionally forcing a specific device so users can
    /// pick the right microphone when the machine exposes several inputs.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = if let Some(name) = preferred_device {
            host.input_devices()
                .context("no input devices available")?
                .find(|d| d.name().is_ok_and(|n| n == name))
                .ok_or_else(|| anyhow!("input device '{name}' not found"))?
        } else {
            host.default_input_device()
                .context("no default input device available")?
        };
        Ok(Self { device })
    }

    /// Get the name of the active recording device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "unknown input device".into())
    }

    /// Record until `stop` is set or `max_duration` elapses, whichever comes
    /// first. An immediate stop yields an empty (but valid) recording rather
    /// than an error.
    pub fn record_until(
        &self,
        stop: &AtomicBool,
        requested_rate: u32,
        max_duration: Option<Duration>,
    ) -> Result<Recording> {
        let default_config = self
            .device
            .default_input_config()
            .context("failed to query input device configuration")?;
        let format = default_config.sample_format();
        let mut device_config: StreamConfig = default_config.into();
        let channels = usize::from(device_config.channels.max(1));

        if device_config.sample_rate.0 != requested_rate
            && self.supports_rate(format, requested_rate)
        {
            device_config.sample_rate = cpal::SampleRate(requested_rate);
        }
        let sample_rate = device_config.sample_rate.0;

        debug!(
            format = ?format,
            sample_rate,
            channels,
            device = %self.device_name(),
            "opening input stream"
        );

        let (sender, receiver) = bounded::<Vec<f32>>(FRAME_CHANNEL_CAPACITY);
        let dropped = Arc::new(AtomicUsize::new(0));
        let buffer = Arc::new(Mutex::new(FrameBuffer::new(
            FRAME_SAMPLES,
            sender,
            dropped.clone(),
        )));

        let err_fn = |err| debug!("audio stream error: {err}");
        let stream = match format {
            SampleFormat::F32 => {
                let buffer = buffer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut buffer) = buffer.try_lock() {
                            buffer.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::I16 => {
                let buffer = buffer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut buffer) = buffer.try_lock() {
                            buffer.push(data, channels, |sample| sample as f32 / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::U16 => {
                let buffer = buffer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut buffer) = buffer.try_lock() {
                            buffer.push(data, channels, |sample| {
                                (sample as f32 - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };

        stream.play().context("failed to start input stream")?;

        let started = Instant::now();
        let mut samples: Vec<f32> = Vec::new();
        let mut frames_processed = 0usize;
        let stop_reason;

        loop {
            if stop.load(Ordering::Relaxed) {
                stop_reason = StopReason::Interrupt;
                break;
            }
            if let Some(limit) = max_duration {
                if started.elapsed() >= limit {
                    stop_reason = StopReason::MaxDuration;
                    break;
                }
            }
            match receiver.recv_timeout(RECV_WAIT) {
                Ok(frame) => {
                    frames_processed += 1;
                    samples.extend_from_slice(&frame);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    stop_reason = StopReason::StreamClosed;
                    break;
                }
            }
        }

        if let Err(err) = stream.pause() {
            debug!("failed to pause audio stream: {err}");
        }
        drop(stream);

        // Drain frames that arrived while we were deciding to stop.
        while let Ok(frame) = receiver.try_recv() {
            frames_processed += 1;
            samples.extend_from_slice(&frame);
        }

        let metrics = CaptureMetrics {
            capture_ms: started.elapsed().as_millis() as u64,
            frames_processed,
            frames_dropped: dropped.load(Ordering::Relaxed),
            stop_reason,
        };
        debug!(
            capture_ms = metrics.capture_ms,
            frames_processed = metrics.frames_processed,
            frames_dropped = metrics.frames_dropped,
            stop_reason = metrics.stop_reason.label(),
            "capture finished"
        );

        Ok(Recording {
            samples,
            sample_rate,
            metrics,
        })
    }

    fn supports_rate(&self, format: SampleFormat, rate: u32) -> bool {
        match self.device.supported_input_configs() {
            Ok(mut ranges) => ranges.any(|range| {
                range.sample_format() == format
                    && range.min_sample_rate().0 <= rate
                    && rate <= range.max_sample_rate().0
            }),
            Err(_) => false,
        }
    }
}
