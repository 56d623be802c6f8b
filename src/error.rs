//! Error types for the nebula chat client

use thiserror::Error;

/// Result type alias for nebula operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the chat client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone access denied or no input device present
    #[error("input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Audio processing or playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text request failed or returned an error status
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Text-to-speech request or playback failed
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Remote query endpoint unreachable or errored
    #[error("query failed: {0}")]
    Query(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
