//! Audio Player Port - response playback.
//!
//! `play` returns once playback has started. Completion is reported
//! asynchronously through the registered listener, tagged with the turn
//! generation it was started under so stale reports can be dropped.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::voice::{AudioBlob, TurnGeneration};

pub type PlaybackListener = Arc<dyn Fn(PlaybackEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ended { generation: TurnGeneration },
    Failed { generation: TurnGeneration, reason: String },
}

impl PlaybackEvent {
    pub fn generation(&self) -> TurnGeneration {
        match self {
            Self::Ended { generation } | Self::Failed { generation, .. } => *generation,
        }
    }
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: AudioBlob, generation: TurnGeneration) -> Result<(), PlaybackError>;

    /// Hard stop. No `Ended` event is emitted for the stopped audio.
    fn stop(&self);

    fn set_listener(&self, listener: PlaybackListener);
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("cannot decode audio: {0}")]
    Decode(String),
}
