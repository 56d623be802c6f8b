//! Configuration management
//!
//! Settings come from an optional TOML file
//! (`~/.config/nebula/config.toml`) overlaid by environment variables;
//! env always wins. Credentials are never baked into the binary — the
//! STT bearer token and TTS API key must arrive through one of these
//! two sources.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::tts::{ClipCue, SilentCue, Voice, WaitingCue};
use crate::{Error, Result};

/// Default query endpoint (local backend)
const DEFAULT_QUERY_URL: &str = "http://127.0.0.1:8000/query";

/// Default STT endpoint (Hugging Face whisper-tiny inference)
const DEFAULT_STT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-tiny";

/// Default TTS endpoint (RapidAPI OpenAI TTS)
const DEFAULT_TTS_ENDPOINT: &str = "https://open-ai-text-to-speech1.p.rapidapi.com/";

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote query endpoint URL
    pub query_url: String,

    /// STT endpoint and credential
    pub stt: SttConfig,

    /// TTS endpoint, credential and voice
    pub tts: TtsConfig,
}

/// Speech-to-text settings
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Transcription endpoint URL
    pub endpoint: String,

    /// Bearer token; voice input is disabled when absent
    pub api_token: Option<String>,
}

/// Text-to-speech settings
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Synthesis endpoint URL
    pub endpoint: String,

    /// API key; narration is disabled when absent
    pub api_key: Option<String>,

    /// Voice used for narration
    pub voice: Voice,

    /// Local MP3 clips played while waiting for synthesis
    pub waiting_clips: Vec<PathBuf>,
}

impl TtsConfig {
    /// Build the waiting-cue strategy for these settings
    #[must_use]
    pub fn waiting_cue(&self) -> Arc<dyn WaitingCue> {
        if self.waiting_clips.is_empty() {
            Arc::new(SilentCue)
        } else {
            Arc::new(ClipCue::new(self.waiting_clips.clone()))
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed, or
    /// a configured voice name is unknown.
    pub fn load() -> Result<Self> {
        let fc = load_config_file()?;

        let query_url = std::env::var("NEBULA_QUERY_URL")
            .ok()
            .or(fc.query_url)
            .unwrap_or_else(|| DEFAULT_QUERY_URL.to_string());

        let stt = SttConfig {
            endpoint: std::env::var("NEBULA_STT_ENDPOINT")
                .ok()
                .or(fc.stt.endpoint)
                .unwrap_or_else(|| DEFAULT_STT_ENDPOINT.to_string()),
            api_token: std::env::var("STT_API_TOKEN").ok().or(fc.stt.api_token),
        };

        let voice_name = std::env::var("NEBULA_TTS_VOICE").ok().or(fc.tts.voice);
        let voice = match voice_name {
            Some(name) => name.parse()?,
            None => Voice::default(),
        };

        let tts = TtsConfig {
            endpoint: std::env::var("NEBULA_TTS_ENDPOINT")
                .ok()
                .or(fc.tts.endpoint)
                .unwrap_or_else(|| DEFAULT_TTS_ENDPOINT.to_string()),
            api_key: std::env::var("TTS_API_KEY").ok().or(fc.tts.api_key),
            voice,
            waiting_clips: fc.tts.waiting_clips.unwrap_or_default(),
        };

        Ok(Self {
            query_url,
            stt,
            tts,
        })
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of
/// defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    query_url: Option<String>,

    #[serde(default)]
    stt: SttFileConfig,

    #[serde(default)]
    tts: TtsFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SttFileConfig {
    endpoint: Option<String>,
    api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TtsFileConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    voice: Option<String>,
    waiting_clips: Option<Vec<PathBuf>>,
}

/// Path of the user config file, if a home directory is known
fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("nebula").join("config.toml"))
}

fn load_config_file() -> Result<ConfigFile> {
    let Some(path) = config_file_path() else {
        return Ok(ConfigFile::default());
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let parsed = toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("invalid config file {}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), "loaded config file");
            Ok(parsed)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(e.into()),
    }
}
