//! Speech Recognizer Port - audio to text plus a language guess.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::voice::{AudioBlob, InteractionError};

/// Port for speech-to-text services.
///
/// Implementations report the raw language label they detected; mapping it
/// onto the supported set is the orchestrator's job.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &AudioBlob) -> Result<Transcription, RecognitionError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    /// Raw label as reported by the service (e.g. "english", "es-ES").
    pub language: Option<String>,
    pub confidence: Option<f32>,
}

impl Transcription {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            confidence: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecognitionError {
    #[error("recognition service error: {0}")]
    Service(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("primary recognizer failed ({primary}); fallback failed ({fallback})")]
    AllFailed { primary: String, fallback: String },
}

impl RecognitionError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}

impl From<RecognitionError> for InteractionError {
    fn from(err: RecognitionError) -> Self {
        InteractionError::recognition(err.to_string())
    }
}
