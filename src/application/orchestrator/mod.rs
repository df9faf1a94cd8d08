//! Interaction Orchestrator - the voice conversation state machine.
//!
//! A single authoritative `InteractionState` driven by [`InteractionEvent`]s
//! through [`InteractionOrchestrator::dispatch`]. Side effects (recording,
//! animations, timers, playback) run from the named handlers below.
//!
//! # Guards
//!
//! Applied in this order:
//!
//! 1. `StartListening` is a no-op while already listening
//! 2. VAD-driven transitions closer than the debounce window are rejected
//! 3. Barge-in needs the minimum robot speaking time
//! 4. Empty recordings skip transcription
//! 5. Insignificant transcripts never reach the language tracker or the
//!    dialogue model
//!
//! # Stale completions
//!
//! Every playback is tagged with the current [`TurnGeneration`]. Barge-in,
//! restarts and session ends bump the generation, so completions reported
//! for older audio are dropped.

mod events;
mod turn;

pub use events::{InteractionEvent, OrchestratorSettings, VoicePorts};

use turn::PauseDecision;

use rand::RngCore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::application::session::SessionManager;
use crate::domain::conversation::{
    AgentStateTracker, CannedUtterance, CaptureReason, DialogueHistory, LeadSnapshot, PromptCache,
    SystemPromptBuilder,
};
use crate::domain::foundation::{SessionId, StateMachine, Timestamp};
use crate::domain::voice::{
    Animation, AnimationGate, InteractionError, InteractionState, PauseClassifier, PauseHistory,
    SessionEvent, TurnGeneration, VadProfile,
};

pub type DispatchResult = Result<InteractionState, InteractionError>;

pub struct InteractionOrchestrator {
    ports: VoicePorts,
    settings: OrchestratorSettings,
    session: SessionManager,
    tracker: AgentStateTracker,
    prompts: SystemPromptBuilder,
    prompt_cache: PromptCache,
    history: DialogueHistory,
    pause_classifier: PauseClassifier,
    pause_history: PauseHistory,
    animation_gate: AnimationGate,
    rng: Box<dyn RngCore + Send + Sync>,
    scheduler: Option<UnboundedSender<InteractionEvent>>,

    state: InteractionState,
    generation: TurnGeneration,
    active_session: Option<SessionId>,
    last_vad_transition: Option<Instant>,
    recording: bool,
    turn_speech_ms: u64,
    pending_pause: Option<u64>,
    next_pause_token: u64,
    rate_limited_until: Option<Instant>,
    last_response: Option<String>,
}

impl InteractionOrchestrator {
    pub fn new(
        ports: VoicePorts,
        settings: OrchestratorSettings,
        session: SessionManager,
        tracker: AgentStateTracker,
        prompt_cache: PromptCache,
        rng: Box<dyn RngCore + Send + Sync>,
    ) -> Self {
        Self {
            history: DialogueHistory::new(settings.max_history_messages),
            pause_classifier: PauseClassifier::new(settings.pause_thresholds),
            pause_history: PauseHistory::default(),
            animation_gate: AnimationGate::new(settings.animation_cooldown),
            prompts: SystemPromptBuilder::default(),
            ports,
            settings,
            session,
            tracker,
            prompt_cache,
            rng,
            scheduler: None,
            state: InteractionState::Idle,
            generation: TurnGeneration::default(),
            active_session: None,
            last_vad_transition: None,
            recording: false,
            turn_speech_ms: 0,
            pending_pause: None,
            next_pause_token: 0,
            rate_limited_until: None,
            last_response: None,
        }
    }

    pub fn with_prompt_builder(mut self, prompts: SystemPromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Channel the orchestrator uses to schedule its own delayed events
    /// (pause grace periods). Without it pause gating processes at once.
    pub fn with_scheduler(mut self, scheduler: UnboundedSender<InteractionEvent>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn generation(&self) -> TurnGeneration {
        self.generation
    }

    pub fn ports(&self) -> &VoicePorts {
        &self.ports
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn tracker(&self) -> &AgentStateTracker {
        &self.tracker
    }

    pub fn prompt_cache(&self) -> &PromptCache {
        &self.prompt_cache
    }

    pub fn history(&self) -> &DialogueHistory {
        &self.history
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Remaining rate-limit wait, if any.
    pub fn rate_limit_remaining(&self) -> Option<std::time::Duration> {
        self.rate_limited_until
            .map(|until| until.saturating_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Applies one event and returns the resulting state.
    ///
    /// Recoverable conditions are handled internally. Fatal failures and
    /// rate limits come back as `Err` after the state has been updated.
    pub async fn dispatch(&mut self, event: InteractionEvent) -> DispatchResult {
        debug!(event = event.name(), state = %self.state, "Dispatching interaction event");
        match event {
            InteractionEvent::StartSession => self.handle_start_session().await,
            InteractionEvent::EndSession => self.handle_end_session().await,
            InteractionEvent::StartListening => self.handle_start_listening().await,
            InteractionEvent::StopListening => self.handle_stop_listening().await,
            InteractionEvent::SpeechStarted => self.handle_speech_started().await,
            InteractionEvent::SpeechEnded {
                speech_ms,
                silence_ms,
            } => self.handle_speech_ended(speech_ms, silence_ms).await,
            InteractionEvent::SpeechDiscarded { speech_ms } => {
                self.handle_speech_discarded(speech_ms).await
            }
            InteractionEvent::PlaybackEnded { generation } => {
                self.handle_playback_finished(generation, None).await
            }
            InteractionEvent::PlaybackFailed { generation, reason } => {
                self.handle_playback_finished(generation, Some(reason)).await
            }
            InteractionEvent::PauseGraceElapsed { token } => self.handle_pause_grace(token).await,
            InteractionEvent::Session(event) => self.handle_session_event(event).await,
        }
    }

    // ---- session lifecycle ----

    async fn handle_start_session(&mut self) -> DispatchResult {
        if self.active_session.is_some() && self.session.is_active() {
            debug!("Session already running");
            return Ok(self.state);
        }
        self.ensure_session();

        self.animate_forced(Animation::ApproachCamera);
        self.animate_forced(Animation::Waving);

        if self.settings.greet_on_start && self.state == InteractionState::Idle {
            let language = self.tracker.confirmed_language();
            let greeting = CannedUtterance::Greeting.text(language);
            self.speak(greeting, language, false).await?;
            Ok(self.state)
        } else {
            self.enter_listening(VadProfile::Standard)?;
            Ok(self.state)
        }
    }

    async fn handle_end_session(&mut self) -> DispatchResult {
        self.end_conversation().await?;
        Ok(self.state)
    }

    async fn handle_session_event(&mut self, event: SessionEvent) -> DispatchResult {
        match event {
            SessionEvent::Started { .. } => {}
            // The manager ends the session itself; `Ended` follows.
            SessionEvent::IdleTimeout => info!("Visitor idle, session closing"),
            SessionEvent::ListenTimeout => {
                let silence_ms = self.session.settings().listen_timeout.as_millis() as u64;
                if self.state == InteractionState::Listening
                    && self.settings.pause_gating
                    && self.silence_ends_session(silence_ms)
                {
                    info!(silence_ms, "Long silence, closing session");
                    self.end_conversation().await?;
                } else if self.state == InteractionState::Listening {
                    info!("Nobody spoke, going idle");
                    self.set_state(InteractionState::Idle)?;
                    self.ports.vad.pause();
                    self.animate(Animation::ShakeLegsTwist);
                    let language = self.tracker.confirmed_language();
                    self.ports
                        .observer
                        .on_response(CannedUtterance::ListenTimeout.text(language), language);
                }
            }
            SessionEvent::MaxDurationReached => {
                let language = self.tracker.confirmed_language();
                self.ports
                    .observer
                    .on_response(CannedUtterance::Farewell.text(language), language);
                self.end_conversation().await?;
            }
            SessionEvent::Ended {
                session_id,
                turn_count,
            } => {
                if self.active_session == Some(session_id) {
                    self.finalize_session(turn_count).await?;
                }
            }
        }
        Ok(self.state)
    }

    /// Makes sure a session is running before the first turn.
    fn ensure_session(&mut self) {
        if self.active_session.is_some() && self.session.is_active() {
            return;
        }
        let id = self.session.start_session();
        self.tracker.start_session();
        self.history.clear();
        self.pause_history.clear();
        self.animation_gate.reset();
        self.last_response = None;
        self.active_session = Some(id);
    }

    /// Stops everything in flight and closes the session.
    async fn end_conversation(&mut self) -> Result<(), InteractionError> {
        self.cancel_in_flight();
        let turn_count = self
            .session
            .end_session()
            .map(|record| record.turn_count)
            .unwrap_or_else(|| self.session.turn_count());
        self.finalize_session(turn_count).await
    }

    async fn finalize_session(&mut self, turn_count: u32) -> Result<(), InteractionError> {
        let Some(session_id) = self.active_session.take() else {
            return Ok(());
        };
        self.cancel_in_flight();
        self.capture_lead_as(session_id, CaptureReason::SessionEnded, turn_count)
            .await;
        self.animate_forced(Animation::Goodbye);
        self.ports.vad.apply_profile(VadProfile::Standard);
        self.set_state(InteractionState::Idle)?;
        info!(session_id = %session_id, turns = turn_count, "Conversation finished");
        Ok(())
    }

    // ---- listening ----

    async fn handle_start_listening(&mut self) -> DispatchResult {
        if self.state.is_listening() {
            debug!(state = %self.state, "Already listening");
            return Ok(self.state);
        }
        if self.state == InteractionState::Processing {
            debug!("Turn in flight, start_listening ignored");
            return Ok(self.state);
        }
        if self.state == InteractionState::Speaking {
            self.interrupt_playback();
        }

        self.ensure_session();
        self.ports.vad.resume();
        self.enter_listening(VadProfile::Standard)?;
        Ok(self.state)
    }

    async fn handle_stop_listening(&mut self) -> DispatchResult {
        match self.state {
            InteractionState::ListeningActive => {
                self.last_vad_transition = Some(Instant::now());
                self.process_turn().await
            }
            InteractionState::Listening => {
                self.session.stop_listening();
                self.set_state(InteractionState::Idle)?;
                Ok(self.state)
            }
            _ => Ok(self.state),
        }
    }

    async fn handle_speech_started(&mut self) -> DispatchResult {
        match self.state {
            InteractionState::Listening => {
                if self.is_debounced() {
                    debug!("speech_start inside debounce window");
                    return Ok(self.state);
                }
                self.begin_recording().await
            }
            InteractionState::ListeningActive => {
                if self.pending_pause.take().is_some() {
                    debug!("Speech resumed during pause grace");
                }
                Ok(self.state)
            }
            InteractionState::Speaking => {
                if self.is_debounced() {
                    debug!("speech_start inside debounce window");
                    return Ok(self.state);
                }
                if !self.session.can_barge_in() {
                    debug!("Barge-in ignored, robot has not spoken long enough");
                    return Ok(self.state);
                }
                info!(generation = %self.generation, "Barge-in");
                self.interrupt_playback();
                self.begin_recording().await
            }
            _ => Ok(self.state),
        }
    }

    async fn handle_speech_ended(&mut self, speech_ms: u64, silence_ms: u64) -> DispatchResult {
        if self.state != InteractionState::ListeningActive {
            return Ok(self.state);
        }

        let debounced = self.is_debounced();
        let too_short = speech_ms < self.settings.min_speech.as_millis() as u64;
        if debounced || too_short {
            if self.turn_speech_ms > 0 {
                return self.keep_held_speech().await;
            }
            debug!(speech_ms, debounced, too_short, "Speech segment discarded as noise");
            return self.discard_recording();
        }

        self.turn_speech_ms += speech_ms;
        self.last_vad_transition = Some(Instant::now());

        if self.settings.pause_gating {
            if let PauseDecision::Hold = self.classify_pause(speech_ms, silence_ms) {
                return Ok(self.state);
            }
        }
        self.process_turn().await
    }

    async fn handle_speech_discarded(&mut self, speech_ms: u64) -> DispatchResult {
        if self.state != InteractionState::ListeningActive {
            return Ok(self.state);
        }
        if self.turn_speech_ms > 0 {
            return self.keep_held_speech().await;
        }
        debug!(speech_ms, "Detector discarded speech");
        self.discard_recording()
    }

    async fn handle_pause_grace(&mut self, token: u64) -> DispatchResult {
        if self.pending_pause != Some(token) || self.state != InteractionState::ListeningActive {
            return Ok(self.state);
        }
        self.pending_pause = None;
        self.process_turn().await
    }

    async fn begin_recording(&mut self) -> DispatchResult {
        self.ensure_session();
        if let Err(err) = self.ports.recorder.start().await {
            return self.fail(err.into());
        }
        self.recording = true;
        self.turn_speech_ms = 0;
        self.pending_pause = None;
        self.last_vad_transition = Some(Instant::now());
        self.session.stop_listening();
        self.session.record_activity();
        self.ports.vad.apply_profile(VadProfile::Standard);
        self.set_state(InteractionState::ListeningActive)?;
        Ok(self.state)
    }

    /// Drops the current recording and waits for the next utterance.
    fn discard_recording(&mut self) -> DispatchResult {
        self.ports.recorder.cancel();
        self.recording = false;
        self.pending_pause = None;
        self.last_vad_transition = Some(Instant::now());
        self.enter_listening(VadProfile::Standard)?;
        Ok(self.state)
    }

    fn enter_listening(&mut self, profile: VadProfile) -> Result<(), InteractionError> {
        self.ports.vad.apply_profile(profile);
        self.set_state(InteractionState::Listening)?;
        self.session.start_listening();
        Ok(())
    }

    fn is_debounced(&self) -> bool {
        self.last_vad_transition
            .map_or(false, |last| last.elapsed() < self.settings.vad_debounce)
    }

    /// Hard-stops playback and invalidates its pending completion.
    fn interrupt_playback(&mut self) {
        self.ports.player.stop();
        self.session.stop_speaking();
        self.generation = self.generation.next();
    }

    fn cancel_in_flight(&mut self) {
        if self.state == InteractionState::Speaking {
            self.ports.player.stop();
        }
        if self.recording {
            self.ports.recorder.cancel();
            self.recording = false;
        }
        self.session.stop_speaking();
        self.session.stop_listening();
        self.pending_pause = None;
        self.generation = self.generation.next();
    }

    // ---- helpers ----

    fn set_state(&mut self, next: InteractionState) -> Result<(), InteractionError> {
        let from = self.state;
        if from == next {
            return Ok(());
        }
        from.transition_to(next)
            .map_err(|_| InteractionError::InvalidTransition { from, to: next })?;
        self.state = next;
        if from == InteractionState::Idle {
            // Leaving IDLE starts from a clean slate.
            self.last_response = None;
        }
        info!(from = %from, to = %next, generation = %self.generation, "Interaction state changed");
        self.ports.observer.on_state_changed(from, next);
        Ok(())
    }

    /// Cooldown-gated gesture.
    fn animate(&mut self, animation: Animation) {
        if self.animation_gate.try_acquire(Instant::now()) {
            self.ports.animation.perform(animation);
        } else {
            debug!(animation = animation.name(), "Animation suppressed by cooldown");
        }
    }

    /// Gesture that must happen regardless of the cooldown.
    fn animate_forced(&mut self, animation: Animation) {
        self.animation_gate.force(Instant::now());
        self.ports.animation.perform(animation);
    }

    async fn capture_lead(&mut self, reason: CaptureReason) {
        if let Some(session_id) = self.active_session {
            let turn_count = self.session.turn_count();
            self.capture_lead_as(session_id, reason, turn_count).await;
        }
    }

    async fn capture_lead_as(&self, session_id: SessionId, reason: CaptureReason, turn_count: u32) {
        let context = self.tracker.context();
        let duration_ms = context
            .session_start_time
            .map(|start| Timestamp::now().millis_since(&start))
            .unwrap_or_default();
        let snapshot = LeadSnapshot::from_context(session_id, reason, context, turn_count, duration_ms);

        if let Err(err) = self.ports.lead_sink.on_lead_captured(snapshot).await {
            tracing::warn!(error = %err, ?reason, "Lead capture failed");
        }
    }
}
