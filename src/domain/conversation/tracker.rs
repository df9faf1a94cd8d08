//! Agent state tracker.
//!
//! Owns the [`ConversationContext`] exclusively. The orchestrator feeds it
//! utterances and language detections and reads snapshots back; it never
//! touches context fields directly.

use tracing::{debug, info, warn};

use super::context::ConversationContext;
use super::engine::{ConversationSnapshot, PhaseTransitionEngine};
use super::extractor::LeadExtractor;
use super::lead::LeadData;
use super::phase::ConversationPhase;
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, Timestamp};
use crate::domain::language::{
    ConfirmationSettings, Language, LanguageDecision, LanguageDetection,
    DEFAULT_HISTORY_CAPACITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub default_language: Language,
    pub confirmation: ConfirmationSettings,
    pub history_capacity: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            confirmation: ConfirmationSettings::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// What processing one user utterance changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnAnalysis {
    pub extracted: LeadData,
    pub lead_changed: bool,
    pub meeting_newly_scheduled: bool,
    pub phase_change: Option<(ConversationPhase, ConversationPhase)>,
    pub objection: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AgentStateTracker {
    context: ConversationContext,
    settings: TrackerSettings,
    extractor: LeadExtractor,
    engine: PhaseTransitionEngine,
    turns_in_phase: u32,
}

impl AgentStateTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self::with_engine(settings, PhaseTransitionEngine::default())
    }

    pub fn with_engine(settings: TrackerSettings, engine: PhaseTransitionEngine) -> Self {
        Self {
            context: Self::fresh_context(&settings),
            settings,
            extractor: LeadExtractor::new(),
            engine,
            turns_in_phase: 0,
        }
    }

    fn fresh_context(settings: &TrackerSettings) -> ConversationContext {
        ConversationContext::new(
            settings.default_language,
            settings.confirmation,
            settings.history_capacity,
        )
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn snapshot(&self) -> ConversationContext {
        self.context.clone()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.context.phase
    }

    pub fn turn_count(&self) -> u32 {
        self.context.turn_count
    }

    pub fn lead_data(&self) -> &LeadData {
        &self.context.lead_data
    }

    pub fn confirmed_language(&self) -> Language {
        self.context.confirmed_language()
    }

    /// Resets the context for a new session.
    pub fn start_session(&mut self) {
        self.context = Self::fresh_context(&self.settings);
        let now = Timestamp::now();
        self.context.session_start_time = Some(now);
        self.context.last_activity_time = Some(now);
        self.turns_in_phase = 0;
    }

    pub fn record_activity(&mut self) {
        self.context.last_activity_time = Some(Timestamp::now());
    }

    /// Feeds one normalized detection (or `None` for an unsupported label)
    /// into the confirmation counter and records it in the history.
    ///
    /// An unsupported label counts as agreement with the confirmed
    /// language, so it also clears any pending candidate.
    pub fn observe_language(&mut self, detected: Option<Language>, confidence: f32) -> LanguageDecision {
        let confirmed = self.context.confirmed_language();
        if let Some(language) = detected {
            self.context.language_history.push(LanguageDetection {
                language,
                confidence,
                turn_number: self.context.turn_count,
                timestamp: Timestamp::now(),
            });
        }

        let decision = self
            .context
            .language_confirmation
            .observe(detected.unwrap_or(confirmed));
        self.context.language = decision.response_language(confirmed);
        debug!(?decision, confirmed = %confirmed, "Language detection observed");
        decision
    }

    /// Commits a confirmable pending switch.
    pub fn confirm_language_switch(&mut self) -> Option<Language> {
        let switched = self.context.language_confirmation.confirm_language_switch();
        if let Some(language) = switched {
            info!(language = %language, "Conversation language confirmed");
            self.context.language = language;
        }
        switched
    }

    /// Switches the confirmed language without confirmation.
    pub fn switch_language(&mut self, language: Language) {
        self.context.language_confirmation.switch_to(language);
        self.context.language = language;
        info!(language = %language, "Conversation language switched");
    }

    /// Extracts lead data, tracks objections and applies the suggested phase.
    pub fn process_user_message(&mut self, text: &str) -> TurnAnalysis {
        self.record_activity();

        let extracted = self.extractor.extract(text);
        let had_meeting = self.context.lead_data.has_meeting();
        let lead_changed = self.context.lead_data.merge(extracted.clone());
        let meeting_newly_scheduled = !had_meeting && self.context.lead_data.has_meeting();

        if let Some(topic) = extracted.interest.first() {
            self.context.last_topic = Some(topic.clone());
        }

        let current = self.context.phase;
        let suggestion = {
            let snapshot = ConversationSnapshot::new(
                self.context.turn_count,
                self.turns_in_phase,
                text,
                &self.context.lead_data,
            );
            self.engine.suggest(current, &snapshot)
        };

        if let Some(objection) = &suggestion.objection {
            self.context.add_objection(objection);
        }

        let mut phase_change = None;
        if suggestion.phase == current {
            self.turns_in_phase += 1;
        } else if let Ok(next) = self.transition_to(suggestion.phase) {
            phase_change = Some((current, next));
        }

        self.context.turn_count += 1;

        TurnAnalysis {
            extracted,
            lead_changed,
            meeting_newly_scheduled,
            phase_change,
            objection: suggestion.objection,
        }
    }

    /// Moves to `target` if the phase table allows it.
    ///
    /// Rejected transitions are logged and leave the phase unchanged.
    pub fn transition_to(&mut self, target: ConversationPhase) -> Result<ConversationPhase, DomainError> {
        let current = self.context.phase;
        match current.transition_to(target) {
            Ok(next) => {
                info!(from = %current, to = %next, "Conversation phase changed");
                self.context.phase = next;
                self.turns_in_phase = 0;
                Ok(next)
            }
            Err(err) => {
                warn!(from = %current, to = %target, "Rejected conversation phase transition");
                Err(DomainError::new(ErrorCode::InvalidPhaseTransition, err.to_string())
                    .with_detail("from", current.label())
                    .with_detail("to", target.label()))
            }
        }
    }
}

impl Default for AgentStateTracker {
    fn default() -> Self {
        Self::new(TrackerSettings::default())
    }
}
