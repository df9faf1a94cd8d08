//! Audio Recorder Port - microphone capture sessions.
//!
//! The recorder may share its underlying media stream with the VAD engine.
//! Stopping or cancelling a recording must never tear down that stream.

use async_trait::async_trait;

use crate::domain::voice::{AudioBlob, InteractionError};

/// Port for capturing one utterance at a time.
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Opens a capture session.
    ///
    /// Fails with `MicrophoneUnavailable` if permission is denied or no
    /// device is present.
    async fn start(&self) -> Result<(), RecorderError>;

    /// Closes the capture session and returns what was recorded.
    async fn stop(&self) -> Result<AudioBlob, RecorderError>;

    /// Drops the current capture without producing audio. No-op when idle.
    fn cancel(&self);

    fn is_recording(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecorderError {
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(String),

    #[error("no recording in progress")]
    NotRecording,

    #[error("capture failed: {0}")]
    Capture(String),
}

impl From<RecorderError> for InteractionError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::MicrophoneUnavailable(msg) => InteractionError::microphone(msg),
            other => InteractionError::microphone(other.to_string()),
        }
    }
}
