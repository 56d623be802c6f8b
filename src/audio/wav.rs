//! WAV encoding of captured audio
//!
//! Produces the canonical 44-byte RIFF/WAVE header followed by raw
//! sample data, byte-identical across calls for the same input. The STT
//! endpoint accepts exactly this layout, so the writer is hand-rolled
//! rather than delegated to a library that may emit extra chunks.

use crate::{Error, Result};

/// Decoded audio: per-channel f32 samples in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a mono buffer
    ///
    /// # Errors
    ///
    /// Returns error if `sample_rate` is zero
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a stereo buffer from separate left/right channels
    ///
    /// # Errors
    ///
    /// Returns error if `sample_rate` is zero or channel lengths differ
    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::Audio(format!(
                "channel length mismatch: {} vs {}",
                left.len(),
                right.len()
            )));
        }
        Self::new(vec![left, right], sample_rate)
    }

    fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::Audio("sample rate must be positive".to_string()));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Number of channels (1 or 2)
    #[must_use]
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples in storage order: mono as-is, stereo interleaved L,R,L,R,…
    #[must_use]
    pub fn interleaved(&self) -> Vec<f32> {
        match self.channels.as_slice() {
            [mono] => mono.clone(),
            [left, right] => interleave(left, right),
            _ => Vec::new(),
        }
    }
}

/// Output sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit signed integer PCM (format code 1)
    #[default]
    Pcm16,
    /// 32-bit IEEE float (format code 3)
    Float32,
}

impl BitDepth {
    const fn format_code(self) -> u16 {
        match self {
            Self::Pcm16 => 1,
            Self::Float32 => 3,
        }
    }

    const fn bytes_per_sample(self) -> u32 {
        match self {
            Self::Pcm16 => 2,
            Self::Float32 => 4,
        }
    }
}

/// Header length of the produced container
pub const WAV_HEADER_LEN: usize = 44;

/// Encode a sample buffer as an uncompressed WAV byte sequence
///
/// Deterministic: identical input always yields byte-identical output.
/// A zero-length buffer still produces a valid 44-byte header with an
/// empty data chunk.
#[must_use]
pub fn encode(buffer: &SampleBuffer, depth: BitDepth) -> Vec<u8> {
    let samples = buffer.interleaved();
    let bytes_per_sample = depth.bytes_per_sample();
    let channels = u32::from(buffer.channel_count());
    let block_align = channels * bytes_per_sample;
    let data_len = samples.len() as u32 * bytes_per_sample;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&depth.format_code().to_le_bytes());
    out.extend_from_slice(&buffer.channel_count().to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate().to_le_bytes());
    out.extend_from_slice(&(buffer.sample_rate() * block_align).to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&((bytes_per_sample * 8) as u16).to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    match depth {
        BitDepth::Pcm16 => {
            for &sample in &samples {
                out.extend_from_slice(&quantize_i16(sample).to_le_bytes());
            }
        }
        BitDepth::Float32 => {
            for &sample in &samples {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }

    out
}

/// Quantize one f32 sample to i16
///
/// Clamps to [-1.0, 1.0], then scales negatives by 32768 and
/// non-negatives by 32767. The asymmetric factors keep the full signed
/// range reachable (-1.0 maps to -32768, 1.0 to 32767) without
/// overflowing either endpoint; downstream byte compatibility depends
/// on this exact mapping.
#[allow(clippy::cast_possible_truncation)]
fn quantize_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Interleave left and right channels per frame: L0,R0,L1,R1,…
fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    for (&l, &r) in left.iter().zip(right.iter()) {
        result.push(l);
        result.push(r);
    }
    result
}
