//! Voice activity detection configuration, state and events.
//!
//! Times are offsets from the start of the analysed stream, so engines stay
//! deterministic and testable without a clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::ValidationError;

/// Which engine the factory should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VadEngineKind {
    /// Energy threshold detector.
    Rms,
    /// Model based detector. Fails if the environment cannot host it.
    Ml,
    /// Try ML first, fall back to RMS.
    #[default]
    Auto,
}

impl fmt::Display for VadEngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rms => "rms",
            Self::Ml => "ml",
            Self::Auto => "auto",
        };
        f.write_str(s)
    }
}

/// Runtime presets applied over the base configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VadProfile {
    #[default]
    Standard,
    /// After the robot stops talking: more sensitive so a quick reply is caught.
    Relaxed,
    /// While the robot talks: its own voice must not trigger detection.
    BargeIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VadConfig {
    /// RMS level in [0, 1] above which a frame counts as voice.
    pub volume_threshold: f32,
    /// Voice must persist this long before `SpeechStart` fires.
    pub speech_start_delay_ms: u64,
    /// Silence must persist this long before `SpeechEnd` fires.
    pub silence_timeout_ms: u64,
    /// Shorter utterances are discarded as noise.
    pub min_speech_duration_ms: u64,
    /// Ambient noise measurement window at start.
    pub calibration_ms: u64,
    /// Adaptive threshold is `noise_floor * noise_multiplier`, never below `volume_threshold`.
    pub noise_multiplier: f32,
    pub sample_rate: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 0.02,
            speech_start_delay_ms: 150,
            silence_timeout_ms: 1200,
            min_speech_duration_ms: 600,
            calibration_ms: 1000,
            noise_multiplier: 2.5,
            sample_rate: 16_000,
        }
    }
}

impl VadConfig {
    /// Derives the configuration for `profile` from this base.
    pub fn with_profile(&self, profile: VadProfile) -> VadConfig {
        match profile {
            VadProfile::Standard => self.clone(),
            VadProfile::Relaxed => VadConfig {
                volume_threshold: self.volume_threshold * 0.8,
                speech_start_delay_ms: self.speech_start_delay_ms / 2,
                ..self.clone()
            },
            VadProfile::BargeIn => VadConfig {
                volume_threshold: (self.volume_threshold * 2.5).min(1.0),
                silence_timeout_ms: self.silence_timeout_ms / 2,
                ..self.clone()
            },
        }
    }

    pub fn speech_start_delay(&self) -> Duration {
        Duration::from_millis(self.speech_start_delay_ms)
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn min_speech_duration(&self) -> Duration {
        Duration::from_millis(self.min_speech_duration_ms)
    }

    pub fn calibration(&self) -> Duration {
        Duration::from_millis(self.calibration_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.volume_threshold) || self.volume_threshold == 0.0 {
            return Err(ValidationError::out_of_range(
                "volume_threshold",
                0.0,
                1.0,
                self.volume_threshold as f64,
            ));
        }
        if self.noise_multiplier < 1.0 {
            return Err(ValidationError::out_of_range(
                "noise_multiplier",
                1.0,
                f64::MAX,
                self.noise_multiplier as f64,
            ));
        }
        if self.silence_timeout_ms == 0 {
            return Err(ValidationError::invalid_format(
                "silence_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.sample_rate == 0 {
            return Err(ValidationError::invalid_format("sample_rate", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Observable detector state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VadState {
    pub is_listening: bool,
    pub is_speaking: bool,
    /// Last frame level in [0, 1].
    pub current_volume: f32,
    pub speech_start_time: Option<Duration>,
    pub last_speech_time: Option<Duration>,
    pub is_calibrating: bool,
    pub adaptive_threshold: f32,
    pub noise_floor: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VadEvent {
    SpeechStart {
        at: Duration,
        volume: f32,
    },
    SpeechEnd {
        at: Duration,
        speech_ms: u64,
        silence_ms: u64,
    },
    /// Voice ended before `min_speech_duration`.
    SpeechDiscarded {
        at: Duration,
        speech_ms: u64,
    },
    Volume {
        level: f32,
    },
    CalibrationComplete {
        noise_floor: f32,
        threshold: f32,
    },
}

impl VadEvent {
    /// Volume telemetry is high frequency and usually filtered out.
    pub fn is_telemetry(&self) -> bool {
        matches!(self, Self::Volume { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barge_in_raises_threshold_and_shortens_silence() {
        let base = VadConfig::default();
        let barge = base.with_profile(VadProfile::BargeIn);
        assert!(barge.volume_threshold > base.volume_threshold);
        assert!(barge.silence_timeout_ms < base.silence_timeout_ms);
        assert_eq!(barge.min_speech_duration_ms, base.min_speech_duration_ms);
    }

    #[test]
    fn relaxed_lowers_threshold() {
        let base = VadConfig::default();
        let relaxed = base.with_profile(VadProfile::Relaxed);
        assert!(relaxed.volume_threshold < base.volume_threshold);
        assert!(relaxed.speech_start_delay_ms <= base.speech_start_delay_ms);
    }

    #[test]
    fn standard_is_identity() {
        let base = VadConfig::default();
        assert_eq!(base.with_profile(VadProfile::Standard), base);
    }

    #[test]
    fn barge_in_threshold_is_capped() {
        let base = VadConfig {
            volume_threshold: 0.9,
            ..Default::default()
        };
        assert_eq!(base.with_profile(VadProfile::BargeIn).volume_threshold, 1.0);
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let config = VadConfig {
            volume_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(VadConfig::default().validate().is_ok());
    }

    #[test]
    fn engine_kind_parses_lowercase() {
        let kind: VadEngineKind = serde_json::from_str("\"ml\"").unwrap();
        assert_eq!(kind, VadEngineKind::Ml);
        assert_eq!(VadEngineKind::default(), VadEngineKind::Auto);
    }
}
