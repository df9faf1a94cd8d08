//! Dialogue and speech provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::openai::OpenAiConfig;

/// Dialogue, speech synthesis and transcription provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    pub chat_model: String,
    pub tts_model: String,
    pub stt_model: String,
    pub voice: String,
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    pub max_retries: u32,
}

/// Provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    /// Canned replies, no network
    #[default]
    Mock,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// OpenAI client settings, if the key is present.
    pub fn openai(&self) -> Option<OpenAiConfig> {
        let key = self.openai_api_key.as_ref().filter(|_| self.has_openai())?;
        Some(
            OpenAiConfig::new(key.expose_secret().clone())
                .with_chat_model(&self.chat_model)
                .with_tts_model(&self.tts_model)
                .with_stt_model(&self.stt_model)
                .with_voice(&self.voice)
                .with_base_url(&self.base_url)
                .with_timeout(self.timeout())
                .with_max_retries(self.max_retries),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProvider::OpenAI && !self.has_openai() {
            return Err(ValidationError::MissingRequired("SALESBOT__AI__OPENAI_API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive {
                field: "ai.timeout_secs",
            });
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            tts_model: "tts-1".to_string(),
            stt_model: "whisper-1".to_string(),
            voice: "nova".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}
