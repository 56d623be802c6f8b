//! Terminal chat orchestrator
//!
//! Binds stdin input, the conversation log, the recorder and the three
//! remote clients. Thin glue: every remote failure is caught here and
//! degraded to a visible message or a log line, never a crash.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::audio::{BitDepth, Recorder, wav};
use crate::chat::{Conversation, QueryClient};
use crate::stt::{SttClient, TranscriptSink};
use crate::tts::{TtsClient, Voice};
use crate::{Config, Result};

/// Message appended when the query endpoint fails
pub const QUERY_ERROR_FALLBACK: &str = "Error fetching response. Please try again later.";

/// Greeting seeded into every new conversation
const GREETING: &str = "Hello! How can I help you today?";

/// Interactive chat session
pub struct ChatSession {
    conversation: Conversation,
    query: QueryClient,
    stt: Option<Arc<SttClient>>,
    tts: Option<Arc<TtsClient>>,
    recorder: Recorder,
    sink: TranscriptSink,
    voice: Voice,
    speak_replies: bool,
}

impl ChatSession {
    /// Build a session from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if a client cannot be constructed from the config
    pub fn from_config(config: &Config, speak_replies: bool) -> Result<Self> {
        let query = QueryClient::new(config.query_url.clone())?;

        // Voice features degrade to text-only when unconfigured
        let stt = match &config.stt.api_token {
            Some(token) => Some(Arc::new(SttClient::new(
                config.stt.endpoint.clone(),
                token.clone(),
            )?)),
            None => {
                tracing::info!("no STT token configured, /record disabled");
                None
            }
        };

        let tts = match &config.tts.api_key {
            Some(key) => {
                let cue = config.tts.waiting_cue();
                Some(Arc::new(TtsClient::with_cue(
                    config.tts.endpoint.clone(),
                    key.clone(),
                    cue,
                )?))
            }
            None => {
                tracing::info!("no TTS key configured, narration disabled");
                None
            }
        };

        Ok(Self::new(query, stt, tts, config.tts.voice, speak_replies))
    }

    /// Build a session from already-constructed clients
    #[must_use]
    pub fn new(
        query: QueryClient,
        stt: Option<Arc<SttClient>>,
        tts: Option<Arc<TtsClient>>,
        voice: Voice,
        speak_replies: bool,
    ) -> Self {
        let mut conversation = Conversation::new();
        conversation.push_bot(GREETING);

        Self {
            conversation,
            query,
            stt,
            tts,
            recorder: Recorder::new(),
            sink: TranscriptSink::new(),
            voice,
            speak_replies,
        }
    }

    /// The conversation log
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Submit a prompt: append the user message, query the backend,
    /// append the reply (or the error fallback), and return the reply.
    pub async fn submit_prompt(&mut self, prompt: &str) -> String {
        self.conversation.push_user(prompt);
        self.conversation.loading = true;

        let reply = match self.query.ask(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "error fetching response");
                QUERY_ERROR_FALLBACK.to_string()
            }
        };

        self.conversation.push_bot(&reply);
        self.conversation.loading = false;
        reply
    }

    /// Toggle recording
    ///
    /// Starting acquires the microphone; a [`crate::Error::DeviceUnavailable`]
    /// becomes a visible status line and no session is created. Stopping
    /// returns to idle immediately and hands the encode→transcribe
    /// pipeline to a spawned task, delivered through the transcript sink.
    pub fn toggle_recording(&mut self) {
        if self.recorder.is_recording() {
            let samples = self.recorder.stop();
            self.conversation.recording = false;

            let Some(samples) = samples else { return };
            let Some(stt) = self.stt.clone() else {
                return;
            };
            let sink = self.sink.clone();

            tokio::spawn(async move {
                let wav_bytes = wav::encode(&samples, BitDepth::Pcm16);
                match stt.transcribe(wav_bytes).await {
                    Ok(Some(text)) => sink.deliver(text),
                    Ok(None) => tracing::info!("no speech recognized"),
                    Err(e) => tracing::error!(error = %e, "transcription failed"),
                }
            });
        } else {
            if self.stt.is_none() {
                println!("(voice input is not configured)");
                return;
            }
            match self.recorder.start() {
                Ok(()) => {
                    self.conversation.recording = true;
                    println!("(recording — /record again to stop)");
                }
                Err(e) => {
                    println!("(microphone unavailable: {e})");
                }
            }
        }
    }

    /// Run the interactive loop until EOF or `/quit`
    ///
    /// # Errors
    ///
    /// Returns error only on stdin failure; remote errors are handled
    /// in-loop.
    pub async fn run(&mut self) -> Result<()> {
        let (tx, mut transcripts) = mpsc::unbounded_channel::<String>();
        self.sink.set_listener(Box::new(move |text| {
            let _ = tx.send(text);
        }));

        println!("bot> {GREETING}");
        println!("(/record toggles voice input, /say repeats the last reply aloud, /quit exits)");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    match input {
                        "/quit" | "/exit" => break,
                        "/record" => self.toggle_recording(),
                        "/say" => self.narrate_last_reply().await,
                        prompt => self.handle_prompt(prompt).await,
                    }
                }
                Some(text) = transcripts.recv() => {
                    // Recognized speech becomes the next prompt
                    println!("you (voice)> {text}");
                    self.handle_prompt(&text).await;
                }
            }
        }

        self.recorder.stop();
        Ok(())
    }

    async fn handle_prompt(&mut self, prompt: &str) {
        let reply = self.submit_prompt(prompt).await;
        println!("bot> {reply}");

        if self.speak_replies {
            self.speak(&reply).await;
        }
    }

    async fn narrate_last_reply(&mut self) {
        let Some(content) = self
            .conversation
            .last_bot_message()
            .map(|m| m.content.clone())
        else {
            return;
        };
        self.speak(&content).await;
    }

    async fn speak(&self, text: &str) {
        let Some(tts) = &self.tts else {
            println!("(narration is not configured)");
            return;
        };
        if let Err(e) = tts.speak(text, self.voice).await {
            tracing::error!(error = %e, "narration failed");
        }
    }
}
