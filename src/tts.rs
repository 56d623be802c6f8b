//! Text-to-speech client
//!
//! Sends text to a remote synthesis endpoint, receives an MP3 stream and
//! plays it to completion. The returned future resolves when playback
//! finishes, not when the HTTP response arrives.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;

use crate::audio::Player;
use crate::{Error, Result};

/// Fixed model identifier sent with every synthesis request
const TTS_MODEL: &str = "tts-1";

/// Request timeout applied at the HTTP client boundary
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Synthesis voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    #[default]
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    /// Wire identifier for the voice
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

impl FromStr for Voice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alloy" => Ok(Self::Alloy),
            "echo" => Ok(Self::Echo),
            "fable" => Ok(Self::Fable),
            "onyx" => Ok(Self::Onyx),
            "nova" => Ok(Self::Nova),
            "shimmer" => Ok(Self::Shimmer),
            other => Err(Error::Config(format!("unknown voice: {other}"))),
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio played while waiting for the synthesis response
///
/// The cue is started on `speak()` entry and stopped as soon as the real
/// audio is ready or the request fails. Purely a UX affordance.
pub trait WaitingCue: Send + Sync {
    /// Begin the cue
    fn start(&self);
    /// Stop the cue if it is playing
    fn stop(&self);
}

/// No-op cue, used when no clips are configured
#[derive(Debug, Default)]
pub struct SilentCue;

impl WaitingCue for SilentCue {
    fn start(&self) {}
    fn stop(&self) {}
}

/// Plays a randomly chosen local MP3 clip while waiting
pub struct ClipCue {
    clips: Vec<PathBuf>,
    cancel: Arc<AtomicBool>,
}

impl ClipCue {
    /// Create a cue over a set of local clip files
    #[must_use]
    pub fn new(clips: Vec<PathBuf>) -> Self {
        Self {
            clips,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl WaitingCue for ClipCue {
    fn start(&self) {
        if self.clips.is_empty() {
            return;
        }

        let index = rand::thread_rng().gen_range(0..self.clips.len());
        let path = self.clips[index].clone();

        self.cancel.store(false, Ordering::SeqCst);
        let cancel = Arc::clone(&self.cancel);

        std::thread::spawn(move || {
            let result = std::fs::read(&path)
                .map_err(Error::from)
                .and_then(|data| Player::new()?.play_mp3_cancellable(&data, &cancel));
            if let Err(e) = result {
                tracing::warn!(clip = %path.display(), error = %e, "waiting cue failed");
            }
        });
    }

    fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Synthesis request body
#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
}

/// Synthesizes speech from text and plays it
pub struct TtsClient {
    client: reqwest::Client,
    endpoint: String,
    host: String,
    api_key: String,
    cue: Arc<dyn WaitingCue>,
}

impl TtsClient {
    /// Create a new TTS client with no waiting cue
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the endpoint is not a
    /// valid URL
    pub fn new(endpoint: String, api_key: String) -> Result<Self> {
        Self::with_cue(endpoint, api_key, Arc::new(SilentCue))
    }

    /// Create a new TTS client with an injected waiting cue
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the endpoint is not a
    /// valid URL
    pub fn with_cue(endpoint: String, api_key: String, cue: Arc<dyn WaitingCue>) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("TTS API key required".to_string()));
        }

        let host = reqwest::Url::parse(&endpoint)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .ok_or_else(|| Error::Config(format!("invalid TTS endpoint: {endpoint}")))?;

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            endpoint,
            host,
            api_key,
            cue,
        })
    }

    /// Synthesize `text` and play it, resolving at playback end
    ///
    /// Concurrent calls are not serialized; each independently fetches
    /// and plays, so overlapping invocations will sound at once. Known
    /// limitation.
    ///
    /// # Errors
    ///
    /// Returns error if the request, decode, or playback fails. The
    /// waiting cue is stopped on every exit path.
    pub async fn speak(&self, text: &str, voice: Voice) -> Result<()> {
        self.cue.start();

        let request = SpeechRequest {
            model: TTS_MODEL,
            input: text,
            voice: voice.as_str(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.api_key)
            .json(&request)
            .send()
            .await;

        self.cue.stop();

        let response = response.map_err(|e| {
            tracing::error!(error = %e, "TTS request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS endpoint error");
            return Err(Error::Synthesis(format!("TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), voice = %voice, "synthesis complete");

        // Playback is blocking; resolve only once it has finished
        tokio::task::spawn_blocking(move || {
            let player = Player::new()?;
            player.play_mp3(&audio)
        })
        .await
        .map_err(|e| Error::Synthesis(format!("playback task failed: {e}")))?
    }
}
