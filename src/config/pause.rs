//! Pause classification configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::voice::PauseThresholds;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PauseConfig {
    pub min_pause_ms: u64,
    pub breath_max_ms: u64,
    pub thought_max_ms: u64,
    pub sentence_end_max_ms: u64,

    /// Classifications below this confidence never hold a recording open
    pub confidence_floor: f32,
}

impl PauseConfig {
    pub fn thresholds(&self) -> PauseThresholds {
        PauseThresholds {
            min_pause_ms: self.min_pause_ms,
            breath_max_ms: self.breath_max_ms,
            thought_max_ms: self.thought_max_ms,
            sentence_end_max_ms: self.sentence_end_max_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thresholds()
            .validate()
            .map_err(|_| ValidationError::PauseBandsNotIncreasing)?;
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ValidationError::NotAFraction {
                field: "pause.confidence_floor",
                value: self.confidence_floor,
            });
        }
        Ok(())
    }
}

impl Default for PauseConfig {
    fn default() -> Self {
        let bands = PauseThresholds::default();
        Self {
            min_pause_ms: bands.min_pause_ms,
            breath_max_ms: bands.breath_max_ms,
            thought_max_ms: bands.thought_max_ms,
            sentence_end_max_ms: bands.sentence_end_max_ms,
            confidence_floor: 0.6,
        }
    }
}
