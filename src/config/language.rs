//! Conversation language configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::language::{
    ConfirmationSettings, Language, DEFAULT_CONFIRMATION_THRESHOLD, DEFAULT_HISTORY_CAPACITY,
};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageConfig {
    pub default_language: Language,

    /// Require consecutive detections before switching
    pub confirmation_enabled: bool,

    pub confirmation_threshold: u32,

    /// Per-turn detections kept for diagnostics
    pub history_capacity: usize,
}

impl LanguageConfig {
    pub fn confirmation(&self) -> ConfirmationSettings {
        ConfirmationSettings {
            enabled: self.confirmation_enabled,
            threshold: self.confirmation_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.confirmation_threshold == 0 {
            return Err(ValidationError::MustBePositive {
                field: "language.confirmation_threshold",
            });
        }
        if self.history_capacity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "language.history_capacity",
            });
        }
        Ok(())
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default_language: Language::Es,
            confirmation_enabled: false,
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
