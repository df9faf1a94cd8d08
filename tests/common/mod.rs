//! Shared harness: an orchestrator wired to in-memory ports, driven by
//! dispatching events directly under paused tokio time.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;

use salesbot_voice::adapters::mock::{
    MockAudioPlayer, MockDialogueClient, MockLeadSink, MockRecognizer, MockRecorder,
    MockVadControl, RecordingAnimationPort, RecordingObserver,
};
use salesbot_voice::application::{
    DispatchResult, InteractionEvent, InteractionOrchestrator, OrchestratorSettings, SessionManager,
    SessionSettings, VoicePorts,
};
use salesbot_voice::domain::conversation::{AgentStateTracker, PromptCache, TrackerSettings};
use salesbot_voice::domain::voice::InteractionState;

pub const SEED: u64 = 42;

pub struct Options {
    pub settings: OrchestratorSettings,
    pub session: SessionSettings,
    pub tracker: TrackerSettings,
    pub recorder: MockRecorder,
    pub recognizer: MockRecognizer,
    pub dialogue: MockDialogueClient,
    pub player: MockAudioPlayer,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings: OrchestratorSettings::default(),
            session: SessionSettings::default(),
            tracker: TrackerSettings::default(),
            recorder: MockRecorder::new(),
            recognizer: MockRecognizer::new(),
            dialogue: MockDialogueClient::new(),
            player: MockAudioPlayer::new(),
        }
    }
}

pub struct Harness {
    pub recorder: MockRecorder,
    pub recognizer: MockRecognizer,
    pub dialogue: MockDialogueClient,
    pub player: MockAudioPlayer,
    pub animation: RecordingAnimationPort,
    pub lead_sink: MockLeadSink,
    pub vad: MockVadControl,
    pub observer: RecordingObserver,
    pub orchestrator: InteractionOrchestrator,
}

impl Harness {
    pub fn new(options: Options) -> Self {
        let animation = RecordingAnimationPort::new();
        let lead_sink = MockLeadSink::new();
        let vad = MockVadControl::new();
        let observer = RecordingObserver::new();

        let ports = VoicePorts {
            recorder: Arc::new(options.recorder.clone()),
            recognizer: Arc::new(options.recognizer.clone()),
            dialogue: Arc::new(options.dialogue.clone()),
            player: Arc::new(options.player.clone()),
            animation: Arc::new(animation.clone()),
            lead_sink: Arc::new(lead_sink.clone()),
            vad: Arc::new(vad.clone()),
            observer: Arc::new(observer.clone()),
        };

        let orchestrator = InteractionOrchestrator::new(
            ports,
            options.settings,
            SessionManager::new(options.session),
            AgentStateTracker::new(options.tracker),
            PromptCache::new(),
            Box::new(StdRng::seed_from_u64(SEED)),
        );

        Self {
            recorder: options.recorder,
            recognizer: options.recognizer,
            dialogue: options.dialogue,
            player: options.player,
            animation,
            lead_sink,
            vad,
            observer,
            orchestrator,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Options::default())
    }

    /// Routes timer events (pause grace) to `scheduler`.
    pub fn with_scheduler(self, scheduler: UnboundedSender<InteractionEvent>) -> Self {
        Self {
            orchestrator: self.orchestrator.with_scheduler(scheduler),
            ..self
        }
    }

    pub async fn dispatch(&mut self, event: InteractionEvent) -> DispatchResult {
        self.orchestrator.dispatch(event).await
    }

    pub fn state(&self) -> InteractionState {
        self.orchestrator.state()
    }

    /// One visitor utterance: speech start, `speech_ms` of talking, then the
    /// closing silence.
    pub async fn utterance(&mut self, speech_ms: u64) -> DispatchResult {
        self.dispatch(InteractionEvent::SpeechStarted).await?;
        tokio::time::advance(Duration::from_millis(speech_ms)).await;
        self.dispatch(InteractionEvent::SpeechEnded {
            speech_ms,
            silence_ms: 1200,
        })
        .await
    }

    /// Reports the current playback as finished.
    pub async fn finish_playback(&mut self) -> DispatchResult {
        let generation = self.orchestrator.generation();
        self.dispatch(InteractionEvent::PlaybackEnded { generation }).await
    }

    /// Listening → spoken reply → listening again.
    pub async fn full_turn(&mut self) -> DispatchResult {
        if !self.state().is_listening() {
            self.dispatch(InteractionEvent::StartListening).await?;
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        self.utterance(1000).await?;
        self.finish_playback().await
    }
}
