//! Console harness for the voice interaction loop.
//!
//! Each typed line is treated as one visitor utterance: it is staged on the
//! console recorder and driven through the same speech start / speech end
//! events a live detector would produce.
//!
//! Commands: `/start`, `/end`, `/quit`.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use salesbot_voice::adapters::console::{
    ConsoleAnimation, ConsoleObserver, ConsolePlayer, ConsoleRecorder, LoggingLeadSink,
};
use salesbot_voice::adapters::mock::MockDialogueClient;
use salesbot_voice::adapters::{
    create_vad_engine, FallbackRecognizer, OpenAiDialogueClient, OpenAiTranscriber, SharedVad,
    TextPayloadRecognizer,
};
use salesbot_voice::application::{
    InteractionEvent, InteractionOrchestrator, SessionManager, VoiceLoop, VoiceLoopHandle, VoicePorts,
};
use salesbot_voice::config::{AppConfig, FeatureFlags};
use salesbot_voice::domain::conversation::{AgentStateTracker, PromptCache};
use salesbot_voice::ports::{DialogueClient, SpeechRecognizer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(features: &FeatureFlags) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salesbot_voice=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if features.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn remote_clients(config: &AppConfig) -> (Arc<dyn DialogueClient>, Arc<dyn SpeechRecognizer>) {
    match config.ai.openai() {
        Some(openai) => {
            info!(model = %openai.chat_model, "Using OpenAI dialogue client");
            // Typed lines never need the network; real audio falls through to Whisper.
            let recognizer = FallbackRecognizer::new(
                TextPayloadRecognizer::new(),
                OpenAiTranscriber::new(openai.clone()),
            );
            (Arc::new(OpenAiDialogueClient::new(openai)), Arc::new(recognizer))
        }
        None => {
            warn!("No OpenAI key configured, replies are canned");
            (
                Arc::new(MockDialogueClient::new()),
                Arc::new(TextPayloadRecognizer::new()),
            )
        }
    }
}

/// Drives one typed utterance through the detector events.
async fn say(handle: &VoiceLoopHandle, config: &AppConfig, text: &str) -> Result<(), BoxError> {
    let min_speech_ms = config.voice.min_speech_ms;
    let speech_ms = (text.chars().count() as u64 * 60).max(min_speech_ms);

    handle.send(InteractionEvent::StartListening)?;
    handle.send(InteractionEvent::SpeechStarted)?;
    let hold = config.voice.vad_debounce_ms.max(min_speech_ms) + 50;
    tokio::time::sleep(Duration::from_millis(hold)).await;
    handle.send(InteractionEvent::SpeechEnded {
        speech_ms,
        silence_ms: config.vad.silence_timeout_ms,
    })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.features);
    config.validate()?;

    let vad = Arc::new(SharedVad::new(create_vad_engine(
        config.vad.engine,
        config.vad.to_vad_config(),
    )?));
    info!(engine = vad.engine_name(), used_fallback = vad.used_fallback(), "VAD ready");

    let (dialogue, recognizer) = remote_clients(&config);
    let recorder = Arc::new(ConsoleRecorder::new());

    let ports = VoicePorts {
        recorder: recorder.clone(),
        recognizer,
        dialogue,
        player: Arc::new(ConsolePlayer::new()),
        animation: Arc::new(ConsoleAnimation),
        lead_sink: Arc::new(LoggingLeadSink),
        vad: vad.clone(),
        observer: Arc::new(ConsoleObserver::new(config.features.verbose_errors)),
    };

    let orchestrator = InteractionOrchestrator::new(
        ports,
        config.orchestrator_settings(),
        SessionManager::new(config.session_settings()),
        AgentStateTracker::new(config.tracker_settings()),
        PromptCache::new(),
        Box::new(StdRng::from_entropy()),
    );
    let handle = VoiceLoop::spawn(orchestrator);
    vad.on_event(handle.vad_listener());

    println!("Type what the visitor says. /start, /end, /quit.");
    handle.send(InteractionEvent::StartSession)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => continue,
                    "/quit" | "/exit" => break,
                    "/start" => handle.send(InteractionEvent::StartSession)?,
                    "/end" => handle.send(InteractionEvent::EndSession)?,
                    text => {
                        recorder.stage(text);
                        say(&handle, &config, text).await?;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let orchestrator = handle.shutdown().await?;
    let (hits, misses) = orchestrator.prompt_cache().stats();
    info!(
        phase = %orchestrator.tracker().phase(),
        prompt_cache_hits = hits,
        prompt_cache_misses = misses,
        "Goodbye"
    );
    Ok(())
}
