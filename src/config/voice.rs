//! Interaction loop tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Guards and pacing of the interaction loop
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    /// Minimum spacing between VAD-driven transitions
    pub vad_debounce_ms: u64,

    /// Robot speaking time before barge-in is honoured
    pub barge_in_min_speaking_ms: u64,

    /// Re-open the microphone after each response
    pub auto_restart: bool,

    pub animation_cooldown_ms: u64,

    /// Messages of dialogue history sent with each request
    pub max_history_messages: usize,

    /// Transcripts shorter than this are treated as noise
    pub min_significant_chars: usize,

    /// Speech segments shorter than this are discarded
    pub min_speech_ms: u64,

    /// Classify the closing silence before processing a turn
    pub pause_gating: bool,

    pub pause_grace_ms: u64,

    /// Speak the greeting when a session starts
    pub greet_on_start: bool,
}

impl VoiceConfig {
    pub fn vad_debounce(&self) -> Duration {
        Duration::from_millis(self.vad_debounce_ms)
    }

    pub fn barge_in_min_speaking(&self) -> Duration {
        Duration::from_millis(self.barge_in_min_speaking_ms)
    }

    pub fn animation_cooldown(&self) -> Duration {
        Duration::from_millis(self.animation_cooldown_ms)
    }

    pub fn min_speech(&self) -> Duration {
        Duration::from_millis(self.min_speech_ms)
    }

    pub fn pause_grace(&self) -> Duration {
        Duration::from_millis(self.pause_grace_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_history_messages < 2 {
            return Err(ValidationError::HistoryTooShort);
        }
        if self.pause_gating && self.pause_grace_ms == 0 {
            return Err(ValidationError::MustBePositive {
                field: "voice.pause_grace_ms",
            });
        }
        Ok(())
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            vad_debounce_ms: 500,
            barge_in_min_speaking_ms: 500,
            auto_restart: true,
            animation_cooldown_ms: 800,
            max_history_messages: 10,
            min_significant_chars: 3,
            min_speech_ms: 600,
            pause_gating: false,
            pause_grace_ms: 800,
            greet_on_start: true,
        }
    }
}
