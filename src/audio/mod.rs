//! Audio pipeline: capture, WAV encoding, playback

pub mod capture;
pub mod playback;
pub mod wav;

pub use capture::{CAPTURE_SAMPLE_RATE, Recorder};
pub use playback::Player;
pub use wav::{BitDepth, SampleBuffer, WAV_HEADER_LEN, encode};
