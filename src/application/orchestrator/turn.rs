//! One conversational turn: recording → transcript → language → lead
//! extraction → dialogue → speech, plus the failure paths around it.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{DispatchResult, InteractionEvent, InteractionOrchestrator};
use crate::domain::conversation::{CannedUtterance, CaptureReason, ConversationPhase};
use crate::domain::foundation::StateMachine;
use crate::domain::language::{is_significant, Language, LanguageDecision};
use crate::domain::voice::{
    Animation, AudioBlob, InteractionError, InteractionState, PauseAction, PauseContext,
    ResponseAnimation, TurnGeneration, VadProfile,
};
use crate::ports::{RecorderError, Transcription};

/// A first segment shorter than this counts as "speech just started".
const SPEECH_JUST_STARTED_MS: u64 = 800;

/// What to do with a recording after its closing silence.
pub(super) enum PauseDecision {
    /// Keep recording for the grace period.
    Hold,
    Process,
}

impl InteractionOrchestrator {
    pub(super) fn classify_pause(&mut self, speech_ms: u64, silence_ms: u64) -> PauseDecision {
        let context = PauseContext {
            speech_just_started: self.turn_speech_ms == speech_ms && speech_ms < SPEECH_JUST_STARTED_MS,
            total_speech_ms: self.turn_speech_ms,
            question_pending: self
                .last_response
                .as_deref()
                .map_or(false, |r| r.trim_end().ends_with('?')),
            average_pause_ms: self.pause_history.average(),
        };
        let classification = self.pause_classifier.classify(silence_ms, &context);
        self.pause_history.record(silence_ms);
        debug!(
            silence_ms,
            pause = ?classification.pause_type,
            action = ?classification.action,
            confidence = classification.confidence,
            "Pause classified"
        );

        let confident = classification.is_confident(self.settings.pause_confidence_floor);
        match classification.action {
            PauseAction::Continue | PauseAction::Wait if confident && self.schedule_grace() => {
                PauseDecision::Hold
            }
            _ => PauseDecision::Process,
        }
    }

    /// Classifies a silence in which the visitor said nothing at all.
    /// Only a long silence ends the session.
    pub(super) fn silence_ends_session(&self, silence_ms: u64) -> bool {
        let classification = self
            .pause_classifier
            .classify(silence_ms, &PauseContext::default());
        debug!(
            silence_ms,
            pause = ?classification.pause_type,
            action = ?classification.action,
            "Silence classified"
        );
        classification.action == PauseAction::EndSession
    }

    /// Arms a grace period for the held recording. False without a
    /// scheduler.
    pub(super) fn schedule_grace(&mut self) -> bool {
        let Some(scheduler) = self.scheduler.clone() else {
            return false;
        };
        self.next_pause_token += 1;
        let token = self.next_pause_token;
        self.pending_pause = Some(token);
        let grace = self.settings.pause_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = scheduler.send(InteractionEvent::PauseGraceElapsed { token });
        });
        true
    }

    /// A noise segment arrived while speech is held: keep the captured
    /// speech and wait again, or process it when nothing can schedule the
    /// wait.
    pub(super) async fn keep_held_speech(&mut self) -> DispatchResult {
        self.last_vad_transition = Some(Instant::now());
        if self.schedule_grace() {
            debug!(held_ms = self.turn_speech_ms, "Noise after held speech, waiting again");
            return Ok(self.state);
        }
        self.process_turn().await
    }

    pub(super) async fn process_turn(&mut self) -> DispatchResult {
        self.set_state(InteractionState::Processing)?;
        self.session.stop_listening();
        self.pending_pause = None;
        self.animate(Animation::StartThinking);

        let audio = match self.ports.recorder.stop().await {
            Ok(audio) => audio,
            Err(RecorderError::NotRecording) => AudioBlob::empty(),
            Err(err) => {
                self.recording = false;
                return self.fail(err.into());
            }
        };
        self.recording = false;

        if audio.is_empty() {
            debug!("Empty recording, skipping transcription");
            self.animate_forced(Animation::StopThinking);
            self.after_speech().await?;
            return Ok(self.state);
        }

        let transcription = match self.ports.recognizer.recognize(&audio).await {
            Ok(transcription) => transcription,
            Err(err) => return self.fail(err.into()),
        };
        let text = transcription.text.trim().to_string();

        if !is_significant(&text, self.settings.min_significant_chars) {
            debug!(chars = text.chars().count(), "Insignificant transcript treated as noise");
            self.animate_forced(Animation::StopThinking);
            let language = self.tracker.confirmed_language();
            self.speak(CannedUtterance::NotUnderstood.text(language), language, false)
                .await?;
            return Ok(self.state);
        }

        let language = self.apply_language(&transcription);
        self.ports.observer.on_transcript(&text, language);

        let analysis = self.tracker.process_user_message(&text);
        if analysis.lead_changed {
            self.capture_lead(CaptureReason::LeadUpdated).await;
        }
        if analysis.meeting_newly_scheduled {
            self.animate_forced(Animation::DanceMove);
        }

        if let Some(remaining) = self.rate_limit_remaining() {
            debug!(remaining_ms = remaining.as_millis() as u64, "Send blocked by rate limit");
            return self.rate_limited(remaining.as_millis() as u64);
        }

        let prompt = self.prompts.build(
            &mut self.prompt_cache,
            self.tracker.context(),
            language,
            self.session.is_session_expiring(),
        );
        let history = self.history.to_vec();

        let reply = match self.ports.dialogue.send_message(&text, &history, &prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                return match err.into_dialogue_failure() {
                    InteractionError::RateLimited { retry_after_ms } => self.rate_limited(retry_after_ms),
                    other => self.fail(other),
                }
            }
        };

        self.history.push_exchange(text, reply.clone());
        let turns = self.session.record_turn();
        self.last_response = Some(reply.clone());
        debug!(turns, phase = %self.tracker.phase(), "Turn recorded");

        self.animate_forced(Animation::StopThinking);
        self.speak(&reply, language, true).await?;
        Ok(self.state)
    }

    /// Feeds the detected language to the confirmation tracker and returns
    /// the language for this response.
    fn apply_language(&mut self, transcription: &Transcription) -> Language {
        let previous = self.tracker.confirmed_language();
        let detected = transcription.language.as_deref().and_then(Language::normalize);
        let confidence = transcription.confidence.unwrap_or(1.0);

        match self.tracker.observe_language(detected, confidence) {
            LanguageDecision::SwitchImmediately { candidate } => self.tracker.switch_language(candidate),
            LanguageDecision::Confirmable { .. } => {
                self.tracker.confirm_language_switch();
            }
            LanguageDecision::Keep | LanguageDecision::Pending { .. } => {}
        }

        let confirmed = self.tracker.confirmed_language();
        if confirmed != previous {
            info!(from = %previous, to = %confirmed, "Language changed, prompt cache cleared");
            self.prompt_cache.clear();
        }
        self.tracker.context().language
    }

    /// Shows `text` and plays it if speech is available. Without audio the
    /// turn ends right away.
    pub(super) async fn speak(
        &mut self,
        text: &str,
        language: Language,
        respond: bool,
    ) -> Result<(), InteractionError> {
        self.ports.observer.on_response(text, language);

        match self.ports.dialogue.text_to_speech(text, language).await {
            Ok(Some(audio)) if !audio.is_empty() => self.begin_speaking(audio, respond).await,
            Ok(_) => {
                debug!("No audio for response, text only");
                self.after_speech().await
            }
            Err(err) => {
                let err = err.into_synthesis_failure();
                if let InteractionError::RateLimited { retry_after_ms } = err {
                    self.extend_rate_limit(retry_after_ms);
                }
                warn!(error = %err, "Speech synthesis failed, response shown as text");
                self.after_speech().await
            }
        }
    }

    async fn begin_speaking(&mut self, audio: AudioBlob, respond: bool) -> Result<(), InteractionError> {
        self.generation = self.generation.next();
        self.set_state(InteractionState::Speaking)?;
        self.session.start_speaking();
        self.ports.vad.apply_profile(VadProfile::BargeIn);

        if let Err(err) = self.ports.player.play(audio, self.generation).await {
            warn!(error = %err, "Playback failed to start");
            return self.after_speech().await;
        }

        if respond {
            let turn_index = self.session.turn_count().saturating_sub(1);
            let choice = ResponseAnimation::choose(self.rng.as_mut(), turn_index);
            if let Some(animation) = choice.animation() {
                self.animate(animation);
            }
        }
        Ok(())
    }

    pub(super) async fn handle_playback_finished(
        &mut self,
        generation: TurnGeneration,
        failure: Option<String>,
    ) -> DispatchResult {
        if generation != self.generation {
            debug!(%generation, current = %self.generation, "Stale playback completion dropped");
            return Ok(self.state);
        }
        if self.state != InteractionState::Speaking {
            return Ok(self.state);
        }
        if let Some(reason) = failure {
            warn!(%reason, "Playback failed");
        }
        self.after_speech().await?;
        Ok(self.state)
    }

    /// Robot finished talking: close the session after a farewell, keep
    /// listening if the session allows it, otherwise go idle.
    async fn after_speech(&mut self) -> Result<(), InteractionError> {
        self.session.stop_speaking();

        if self.tracker.phase() == ConversationPhase::Farewell {
            return self.end_conversation().await;
        }

        if self.session.should_auto_restart() && self.rate_limit_remaining().is_none() {
            self.ports.vad.resume();
            self.enter_listening(VadProfile::Relaxed)
        } else {
            self.ports.vad.apply_profile(VadProfile::Standard);
            self.set_state(InteractionState::Idle)
        }
    }

    fn extend_rate_limit(&mut self, retry_after_ms: u64) {
        let until = Instant::now() + Duration::from_millis(retry_after_ms);
        self.rate_limited_until = Some(self.rate_limited_until.map_or(until, |current| current.max(until)));
    }

    /// Surfaces the wait instead of failing the turn.
    fn rate_limited(&mut self, retry_after_ms: u64) -> DispatchResult {
        self.extend_rate_limit(retry_after_ms);
        warn!(retry_after_ms, "Dialogue rate limited");

        self.animate_forced(Animation::StopThinking);
        let language = self.tracker.confirmed_language();
        self.ports
            .observer
            .on_response(CannedUtterance::RateLimited.text(language), language);
        self.session.stop_listening();
        self.set_state(InteractionState::Idle)?;

        let err = InteractionError::rate_limited(retry_after_ms);
        self.ports.observer.on_error(&err);
        Err(err)
    }

    /// Fatal turn failure: ERROR state, neutral pose, fallback utterance.
    pub(super) fn fail(&mut self, err: InteractionError) -> DispatchResult {
        error!(error = %err, state = %self.state, "Interaction turn failed");

        if self.recording {
            self.ports.recorder.cancel();
            self.recording = false;
        }
        if self.state == InteractionState::Speaking {
            self.ports.player.stop();
        }
        self.session.stop_speaking();
        self.session.stop_listening();
        self.pending_pause = None;
        self.generation = self.generation.next();

        if self.state.can_transition_to(&InteractionState::Error) {
            self.set_state(InteractionState::Error)?;
        }

        self.animate_forced(Animation::StopThinking);
        self.animate_forced(Animation::Confused);
        self.animate_forced(Animation::StepBackward);

        let language = self.tracker.confirmed_language();
        self.ports
            .observer
            .on_response(CannedUtterance::Fallback.text(language), language);
        self.ports.observer.on_error(&err);
        Err(err)
    }
}
