//! Conversation context owned by the agent state tracker.

use serde::{Deserialize, Serialize};

use super::lead::LeadData;
use super::phase::ConversationPhase;
use crate::domain::foundation::Timestamp;
use crate::domain::language::{
    ConfirmationSettings, Language, LanguageConfirmation, LanguageHistory,
};

/// Everything the avatar knows about the current conversation.
///
/// Only the tracker mutates this; everyone else reads a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub phase: ConversationPhase,
    pub turn_count: u32,
    pub lead_data: LeadData,
    pub objections: Vec<String>,
    pub last_topic: Option<String>,
    /// Language of the most recent response (may be a pending candidate).
    pub language: Language,
    pub session_start_time: Option<Timestamp>,
    pub last_activity_time: Option<Timestamp>,
    pub language_history: LanguageHistory,
    pub language_confirmation: LanguageConfirmation,
}

impl ConversationContext {
    pub fn new(language: Language, settings: ConfirmationSettings, history_capacity: usize) -> Self {
        Self {
            phase: ConversationPhase::default(),
            turn_count: 0,
            lead_data: LeadData::default(),
            objections: Vec::new(),
            last_topic: None,
            language,
            session_start_time: None,
            last_activity_time: None,
            language_history: LanguageHistory::new(history_capacity),
            language_confirmation: LanguageConfirmation::new(language, settings),
        }
    }

    pub fn confirmed_language(&self) -> Language {
        self.language_confirmation.confirmed_language()
    }

    pub fn pending_language_switch(&self) -> Option<Language> {
        self.language_confirmation.pending_language_switch()
    }

    pub fn language_switch_turn_count(&self) -> u32 {
        self.language_confirmation.language_switch_turn_count()
    }

    /// Records an objection once, ignoring case.
    pub fn add_objection(&mut self, objection: &str) -> bool {
        let objection = objection.trim();
        if objection.is_empty()
            || self
                .objections
                .iter()
                .any(|o| o.eq_ignore_ascii_case(objection))
        {
            return false;
        }
        self.objections.push(objection.to_string());
        true
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(
            Language::default(),
            ConfirmationSettings::default(),
            crate::domain::language::DEFAULT_HISTORY_CAPACITY,
        )
    }
}
