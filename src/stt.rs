//! Speech-to-text client
//!
//! Ships encoded WAV audio to a remote transcription endpoint and
//! returns the recognized text. `transcribe` is a per-call future; the
//! caller owns the continuation. [`TranscriptSink`] exists only for the
//! fire-and-forget capture pipeline, where a long-lived listener slot is
//! the natural shape.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{Error, Result};

/// Request timeout applied at the HTTP client boundary
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from the transcription endpoint
#[derive(serde::Deserialize)]
struct TranscriptResponse {
    text: Option<String>,
}

/// Transcribes WAV audio via a remote STT endpoint
pub struct SttClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl SttClient {
    /// Create a new STT client
    ///
    /// # Errors
    ///
    /// Returns error if the bearer token is missing
    pub fn new(endpoint: String, token: String) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("STT API token required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            endpoint,
            token,
        })
    }

    /// Transcribe WAV bytes to text
    ///
    /// Returns `None` when the service recognized no speech (missing or
    /// empty `text` field).
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is unreachable or answers with a
    /// non-success status.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<Option<String>> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "audio/wav")
            .header("Authorization", format!("Bearer {}", self.token))
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "STT request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT endpoint error");
            return Err(Error::Transcription(format!("STT error {status}: {body}")));
        }

        let result: TranscriptResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse STT response");
            e
        })?;

        match result.text {
            Some(text) if !text.is_empty() => {
                tracing::info!(transcript = %text, "transcription complete");
                Ok(Some(text))
            }
            _ => {
                tracing::debug!("no speech recognized");
                Ok(None)
            }
        }
    }
}

/// Listener invoked with a recognized transcript
pub type TranscriptListener = Box<dyn Fn(String) + Send + 'static>;

/// Single-slot transcript delivery for the capture pipeline
///
/// Registering a new listener replaces the previous one (last writer
/// wins). When recordings overlap, whichever pipeline finishes later
/// delivers to whatever listener is registered at that moment — a
/// deliberate simplification, not an ordering guarantee.
#[derive(Clone, Default)]
pub struct TranscriptSink {
    listener: Arc<Mutex<Option<TranscriptListener>>>,
}

impl TranscriptSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener, replacing any previous one
    pub fn set_listener(&self, listener: TranscriptListener) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(listener);
        }
    }

    /// Deliver a transcript to the registered listener
    ///
    /// With no listener registered the text is logged and dropped.
    pub fn deliver(&self, text: String) {
        match self.listener.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(listener) => listener(text),
                None => tracing::info!(transcript = %text, "no transcript listener registered"),
            },
            Err(_) => tracing::warn!("transcript listener slot poisoned"),
        }
    }
}
