//! Error taxonomy of the interaction loop.

use thiserror::Error;

use super::state::InteractionState;
use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(String),

    /// Primary and fallback recognizers both failed.
    #[error("speech recognition failed: {0}")]
    RecognitionFailure(String),

    #[error("dialogue generation failed: {0}")]
    DialogueFailure(String),

    /// Non-fatal: the text response is still shown.
    #[error("speech synthesis failed: {0}")]
    SpeechSynthesisFailure(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("invalid interaction transition from {from} to {to}")]
    InvalidTransition {
        from: InteractionState,
        to: InteractionState,
    },
}

impl InteractionError {
    pub fn microphone(message: impl Into<String>) -> Self {
        Self::MicrophoneUnavailable(message.into())
    }

    pub fn recognition(message: impl Into<String>) -> Self {
        Self::RecognitionFailure(message.into())
    }

    pub fn dialogue(message: impl Into<String>) -> Self {
        Self::DialogueFailure(message.into())
    }

    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::SpeechSynthesisFailure(message.into())
    }

    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::RateLimited { retry_after_ms }
    }

    /// Fatal errors move the orchestrator to ERROR.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MicrophoneUnavailable(_) | Self::RecognitionFailure(_) | Self::DialogueFailure(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MicrophoneUnavailable(_) => ErrorCode::MicrophoneUnavailable,
            Self::RecognitionFailure(_) => ErrorCode::RecognitionFailed,
            Self::DialogueFailure(_) => ErrorCode::DialogueFailed,
            Self::SpeechSynthesisFailure(_) => ErrorCode::SpeechSynthesisFailed,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
        }
    }
}

impl From<InteractionError> for DomainError {
    fn from(err: InteractionError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            InteractionError::RateLimited { retry_after_ms } => {
                domain.with_detail("retry_after_ms", retry_after_ms.to_string())
            }
            InteractionError::InvalidTransition { from, to } => domain
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            _ => domain,
        }
    }
}
