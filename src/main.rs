use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nebula_chat::audio::{CAPTURE_SAMPLE_RATE, Player, Recorder};
use nebula_chat::tts::TtsClient;
use nebula_chat::{ChatSession, Config, Voice};

/// Nebula - voice-enabled terminal chat client
#[derive(Parser)]
#[command(name = "nebula", version, about)]
struct Cli {
    /// Narrate bot replies aloud
    #[arg(short, long, env = "NEBULA_SPEAK")]
    speak: bool,

    /// Voice for narration (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(long, env = "NEBULA_TTS_VOICE")]
    voice: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (the default)
    Chat,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,nebula_chat=info",
        1 => "info,nebula_chat=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(voice) = &cli.voice {
        config.tts.voice = voice.parse::<Voice>()?;
    }

    match cli.command {
        None | Some(Command::Chat) => {
            tracing::info!(query_url = %config.query_url, "starting chat session");
            let mut session = ChatSession::from_config(&config, cli.speak)?;
            session.run().await?;
            Ok(())
        }
        Some(Command::TestMic { duration }) => test_mic(duration).await,
        Some(Command::TestSpeaker) => test_speaker().await,
        Some(Command::TestTts { text }) => test_tts(&config, &text).await,
    }
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut recorder = Recorder::new();
    recorder.start()?;

    println!("Sample rate: {CAPTURE_SAMPLE_RATE} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = recorder.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        recorder.clear_buffer();
    }

    recorder.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    const TONE_RATE: u32 = 24_000;
    let samples: Vec<f32> = (0..TONE_RATE * 2)
        .map(|i| {
            let t = i as f32 / TONE_RATE as f32;
            0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect();

    let player = Player::new()?;
    tokio::task::spawn_blocking(move || player.play_samples(samples)).await??;

    println!("Done. If you heard nothing, check your output device.");
    Ok(())
}

/// Test TTS output
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let Some(api_key) = &config.tts.api_key else {
        anyhow::bail!("TTS_API_KEY is not configured");
    };

    println!("Synthesizing: {text}");
    let client = TtsClient::new(config.tts.endpoint.clone(), api_key.clone())?;
    client.speak(text, config.tts.voice).await?;
    println!("Done.");

    Ok(())
}
