//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SALESBOT` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment is a valid offline setup.
//!
//! # Example
//!
//! ```no_run
//! use salesbot_voice::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("VAD engine: {}", config.vad.engine);
//! ```

mod ai;
mod error;
mod features;
mod language;
mod pause;
mod session;
mod vad;
mod voice;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use language::LanguageConfig;
pub use pause::PauseConfig;
pub use session::SessionConfig;
pub use vad::VadSettings;
pub use voice::VoiceConfig;

use serde::Deserialize;

use crate::application::{OrchestratorSettings, SessionSettings};
use crate::domain::conversation::TrackerSettings;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Interaction loop guards and pacing
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Voice activity detection
    #[serde(default)]
    pub vad: VadSettings,

    /// Session timers
    #[serde(default)]
    pub session: SessionConfig,

    /// Conversation language and switching
    #[serde(default)]
    pub language: LanguageConfig,

    /// Pause classification bands
    #[serde(default)]
    pub pause: PauseConfig,

    /// Dialogue / speech provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SALESBOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SALESBOT__VOICE__BARGE_IN_MIN_SPEAKING_MS=700` -> `voice.barge_in_min_speaking_ms = 700`
    /// - `SALESBOT__VAD__ENGINE=rms` -> `vad.engine = rms`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SALESBOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.voice.validate()?;
        self.vad.validate()?;
        self.session.validate()?;
        self.language.validate()?;
        self.pause.validate()?;
        self.ai.validate()?;
        Ok(())
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            vad_debounce: self.voice.vad_debounce(),
            animation_cooldown: self.voice.animation_cooldown(),
            max_history_messages: self.voice.max_history_messages,
            min_significant_chars: self.voice.min_significant_chars,
            min_speech: self.voice.min_speech(),
            pause_gating: self.voice.pause_gating,
            pause_grace: self.voice.pause_grace(),
            pause_confidence_floor: self.pause.confidence_floor,
            pause_thresholds: self.pause.thresholds(),
            greet_on_start: self.voice.greet_on_start,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            idle_timeout: self.session.idle_timeout(),
            listen_timeout: self.session.listen_timeout(),
            max_duration: self.session.max_duration(),
            expiring_window: self.session.expiring_window(),
            barge_in_min_speaking: self.voice.barge_in_min_speaking(),
            auto_restart: self.voice.auto_restart,
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            default_language: self.language.default_language,
            confirmation: self.language.confirmation(),
            history_capacity: self.language.history_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::Language;
    use crate::domain::voice::VadEngineKind;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SALESBOT__VOICE__BARGE_IN_MIN_SPEAKING_MS",
        "SALESBOT__VOICE__PAUSE_GATING",
        "SALESBOT__VAD__ENGINE",
        "SALESBOT__VAD__VOLUME_THRESHOLD",
        "SALESBOT__SESSION__IDLE_TIMEOUT_SECS",
        "SALESBOT__LANGUAGE__DEFAULT_LANGUAGE",
        "SALESBOT__LANGUAGE__CONFIRMATION_ENABLED",
        "SALESBOT__AI__PROVIDER",
        "SALESBOT__AI__OPENAI_API_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.voice, VoiceConfig::default());
        assert_eq!(config.session, SessionConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SALESBOT__VOICE__BARGE_IN_MIN_SPEAKING_MS", "700");
        env::set_var("SALESBOT__VOICE__PAUSE_GATING", "true");
        env::set_var("SALESBOT__VAD__ENGINE", "rms");
        env::set_var("SALESBOT__SESSION__IDLE_TIMEOUT_SECS", "90");
        env::set_var("SALESBOT__LANGUAGE__DEFAULT_LANGUAGE", "en");
        env::set_var("SALESBOT__LANGUAGE__CONFIRMATION_ENABLED", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.voice.barge_in_min_speaking_ms, 700);
        assert!(config.voice.pause_gating);
        assert_eq!(config.vad.engine, VadEngineKind::Rms);
        assert_eq!(config.session.idle_timeout_secs, 90);
        assert_eq!(config.language.default_language, Language::En);
        assert!(config.language.confirmation_enabled);
    }

    #[test]
    fn test_openai_provider_without_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SALESBOT__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_openai_key_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SALESBOT__AI__PROVIDER", "openai");
        env::set_var("SALESBOT__AI__OPENAI_API_KEY", "sk-test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert!(config.ai.openai().is_some());
    }

    #[test]
    fn test_settings_conversions() {
        let config = AppConfig {
            voice: VoiceConfig {
                barge_in_min_speaking_ms: 900,
                auto_restart: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let session = config.session_settings();
        assert_eq!(session.barge_in_min_speaking, Duration::from_millis(900));
        assert!(!session.auto_restart);
        assert_eq!(session.idle_timeout, Duration::from_secs(60));

        let orchestrator = config.orchestrator_settings();
        assert_eq!(orchestrator.vad_debounce, Duration::from_millis(500));
        assert_eq!(orchestrator.pause_confidence_floor, 0.6);

        let tracker = config.tracker_settings();
        assert_eq!(tracker.default_language, Language::Es);
        assert!(!tracker.confirmation.enabled);
    }
}
