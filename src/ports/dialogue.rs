//! Dialogue Client Port - assistant text generation and speech synthesis.
//!
//! # Design
//!
//! - History is bounded by the caller; implementations send it as given
//! - Rate limits surface as a distinct error carrying the retry delay
//! - Speech synthesis may legitimately return no audio (text-only mode)

use async_trait::async_trait;

use crate::domain::conversation::DialogueMessage;
use crate::domain::language::Language;
use crate::domain::voice::{AudioBlob, InteractionError};

/// Port for the LLM dialogue service.
#[async_trait]
pub trait DialogueClient: Send + Sync {
    /// Generates the assistant reply to `text`.
    async fn send_message(
        &self,
        text: &str,
        history: &[DialogueMessage],
        system_prompt: &str,
    ) -> Result<String, DialogueError>;

    /// Synthesizes `text`. `Ok(None)` means no audio is available.
    async fn text_to_speech(
        &self,
        text: &str,
        language: Language,
    ) -> Result<Option<AudioBlob>, DialogueError>;
}

/// Dialogue service errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogueError {
    /// HTTP 429 or equivalent.
    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl DialogueError {
    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::RateLimited { retry_after_ms }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Transient failures worth retrying inside the adapter.
    ///
    /// Rate limits are not retried: the wait is surfaced to the visitor.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DialogueError::Unavailable { .. } | DialogueError::Network(_) | DialogueError::Timeout { .. }
        )
    }

    /// Maps a text generation failure into the interaction taxonomy.
    pub fn into_dialogue_failure(self) -> InteractionError {
        match self {
            DialogueError::RateLimited { retry_after_ms } => InteractionError::rate_limited(retry_after_ms),
            other => InteractionError::dialogue(other.to_string()),
        }
    }

    /// Maps a speech synthesis failure into the interaction taxonomy.
    pub fn into_synthesis_failure(self) -> InteractionError {
        match self {
            DialogueError::RateLimited { retry_after_ms } => InteractionError::rate_limited(retry_after_ms),
            other => InteractionError::synthesis(other.to_string()),
        }
    }
}
