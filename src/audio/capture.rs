//! Microphone capture
//!
//! `Recorder` owns the capture lifecycle: Idle until `start()`, Recording
//! until `stop()`. Dropping the cpal stream releases the hardware track,
//! so a stopped recorder never keeps the microphone indicator lit.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream};

use crate::audio::wav::SampleBuffer;
use crate::{Error, Result};

/// Sample rate for speech capture (16kHz mono)
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Records audio from the default input device
pub struct Recorder {
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl Recorder {
    /// Create an idle recorder. No hardware is touched until `start()`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        }
    }

    /// Begin a recording session
    ///
    /// A no-op while already recording; a second `start()` never opens a
    /// duplicate microphone stream. Chunks arriving from the device
    /// callback are appended to the session buffer in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceUnavailable`] if no input device exists or
    /// the stream cannot be opened.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            tracing::debug!("already recording, ignoring start");
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::DeviceUnavailable("no input device".to_string()))?;

        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(CAPTURE_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(CAPTURE_SAMPLE_RATE)
            })
            .ok_or_else(|| {
                Error::DeviceUnavailable("no mono 16kHz input config".to_string())
            })?;

        let config = supported
            .with_sample_rate(SampleRate(CAPTURE_SAMPLE_RATE))
            .config();

        // Fresh session: discard anything left from a previous one
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "capture stream error");
                },
                None,
            )
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

        stream.play().map_err(|e| Error::DeviceUnavailable(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = CAPTURE_SAMPLE_RATE,
            "recording started"
        );
        Ok(())
    }

    /// End the current session and return what was recorded
    ///
    /// Returns `None` when not recording (calling `stop()` twice, or
    /// before any `start()`, is harmless). The stream is consumed via
    /// `Option::take`, so the hardware track is released exactly once.
    /// The recorder is back in the idle state before the caller does
    /// anything with the samples.
    pub fn stop(&mut self) -> Option<SampleBuffer> {
        let stream = self.stream.take()?;
        drop(stream);

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        tracing::debug!(samples = samples.len(), "recording stopped");

        // CAPTURE_SAMPLE_RATE is non-zero, mono() cannot fail
        SampleBuffer::mono(samples, CAPTURE_SAMPLE_RATE).ok()
    }

    /// Whether a session is active
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// Snapshot of the session buffer without draining it
    #[must_use]
    pub fn peek_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Discard buffered samples without ending the session
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}
