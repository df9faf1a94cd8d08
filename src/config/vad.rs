//! Voice activity detection configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::voice::{VadConfig, VadEngineKind};

/// Engine selection plus the detector's base thresholds
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadSettings {
    /// `rms`, `ml` or `auto`
    pub engine: VadEngineKind,
    pub volume_threshold: f32,
    pub speech_start_delay_ms: u64,
    pub silence_timeout_ms: u64,
    pub min_speech_duration_ms: u64,
    pub calibration_ms: u64,
    pub noise_multiplier: f32,
    pub sample_rate: u32,
}

impl VadSettings {
    pub fn to_vad_config(&self) -> VadConfig {
        VadConfig {
            volume_threshold: self.volume_threshold,
            speech_start_delay_ms: self.speech_start_delay_ms,
            silence_timeout_ms: self.silence_timeout_ms,
            min_speech_duration_ms: self.min_speech_duration_ms,
            calibration_ms: self.calibration_ms,
            noise_multiplier: self.noise_multiplier,
            sample_rate: self.sample_rate,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_vad_config()
            .validate()
            .map_err(|err| ValidationError::InvalidVad(err.to_string()))
    }
}

impl Default for VadSettings {
    fn default() -> Self {
        let base = VadConfig::default();
        Self {
            engine: VadEngineKind::default(),
            volume_threshold: base.volume_threshold,
            speech_start_delay_ms: base.speech_start_delay_ms,
            silence_timeout_ms: base.silence_timeout_ms,
            min_speech_duration_ms: base.min_speech_duration_ms,
            calibration_ms: base.calibration_ms,
            noise_multiplier: base.noise_multiplier,
            sample_rate: base.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        let settings = VadSettings::default();
        assert_eq!(settings.engine, VadEngineKind::Auto);
        assert_eq!(settings.to_vad_config(), VadConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_engine_deserialization() {
        let settings: VadSettings = serde_json::from_str(r#"{ "engine": "rms" }"#).unwrap();
        assert_eq!(settings.engine, VadEngineKind::Rms);
    }

    #[test]
    fn test_validation_rejects_threshold_above_one() {
        let settings = VadSettings {
            volume_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(ValidationError::InvalidVad(_))));
    }
}
