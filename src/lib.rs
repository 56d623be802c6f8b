//! Nebula - voice-enabled terminal chat client
//!
//! This library provides the building blocks of the `nebula` binary:
//! - WAV encoding of captured audio
//! - Microphone capture and speaker playback
//! - Speech-to-text and text-to-speech clients
//! - Conversation state and the remote query client
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Terminal REPL                  │
//! │   prompt input  │  /record  │  /say          │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │              Chat orchestrator                │
//! │  Conversation │ Recorder │ STT │ TTS │ Query │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │          Remote HTTP endpoints                │
//! │   query backend  │  STT API  │  TTS API      │
//! └──────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod chat;
pub mod config;
pub mod error;
pub mod repl;
pub mod stt;
pub mod tts;

pub use audio::{BitDepth, Player, Recorder, SampleBuffer};
pub use chat::{ChatMessage, Conversation, MessageId, QueryClient};
pub use config::Config;
pub use error::{Error, Result};
pub use repl::ChatSession;
pub use stt::{SttClient, TranscriptSink};
pub use tts::{TtsClient, Voice, WaitingCue};
