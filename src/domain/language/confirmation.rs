//! Debounced language switching.
//!
//! The confirmed language only changes after the same candidate has been
//! detected on `threshold` consecutive turns. Any other detection resets the
//! candidate. This is a counter with reset-on-mismatch, not an average, so a
//! genuinely changed language takes `threshold` turns to take over.

use serde::{Deserialize, Serialize};

use super::Language;

/// Default number of consecutive detections needed to switch.
pub const DEFAULT_CONFIRMATION_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSettings {
    /// When false every differing detection switches immediately.
    pub enabled: bool,
    pub threshold: u32,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_CONFIRMATION_THRESHOLD,
        }
    }
}

/// What the caller should do with a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageDecision {
    /// Detection agrees with the confirmed language.
    Keep,
    /// Candidate seen `count` times; answer in it for this turn only.
    Pending { candidate: Language, count: u32 },
    /// Threshold reached; commit with `confirm_language_switch`.
    Confirmable { candidate: Language },
    /// Confirmation disabled; switch right away.
    SwitchImmediately { candidate: Language },
}

impl LanguageDecision {
    /// Language the next response should be produced in.
    pub fn response_language(&self, confirmed: Language) -> Language {
        match *self {
            Self::Keep => confirmed,
            Self::Pending { candidate, .. }
            | Self::Confirmable { candidate }
            | Self::SwitchImmediately { candidate } => candidate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfirmation {
    settings: ConfirmationSettings,
    confirmed: Language,
    pending: Option<Language>,
    switch_count: u32,
}

impl LanguageConfirmation {
    pub fn new(initial: Language, settings: ConfirmationSettings) -> Self {
        Self {
            settings: ConfirmationSettings {
                threshold: settings.threshold.max(1),
                ..settings
            },
            confirmed: initial,
            pending: None,
            switch_count: 0,
        }
    }

    pub fn confirmed_language(&self) -> Language {
        self.confirmed
    }

    pub fn pending_language_switch(&self) -> Option<Language> {
        self.pending
    }

    pub fn language_switch_turn_count(&self) -> u32 {
        self.switch_count
    }

    pub fn settings(&self) -> ConfirmationSettings {
        self.settings
    }

    /// Feeds one normalized detection into the counter.
    pub fn observe(&mut self, detected: Language) -> LanguageDecision {
        if detected == self.confirmed {
            self.clear_pending();
            return LanguageDecision::Keep;
        }

        if !self.settings.enabled {
            return LanguageDecision::SwitchImmediately { candidate: detected };
        }

        if self.pending == Some(detected) {
            self.switch_count += 1;
        } else {
            self.pending = Some(detected);
            self.switch_count = 1;
        }

        if self.switch_count >= self.settings.threshold {
            LanguageDecision::Confirmable { candidate: detected }
        } else {
            LanguageDecision::Pending {
                candidate: detected,
                count: self.switch_count,
            }
        }
    }

    /// Commits a confirmable pending switch. Returns the new language, or
    /// `None` if nothing has reached the threshold.
    pub fn confirm_language_switch(&mut self) -> Option<Language> {
        match self.pending {
            Some(candidate) if self.switch_count >= self.settings.threshold => {
                self.confirmed = candidate;
                self.clear_pending();
                Some(candidate)
            }
            _ => None,
        }
    }

    /// Overrides the confirmed language (used for immediate switches).
    pub fn switch_to(&mut self, language: Language) {
        self.confirmed = language;
        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        self.pending = None;
        self.switch_count = 0;
    }
}
