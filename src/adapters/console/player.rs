//! Simulated playback.
//!
//! Holds the audio for its reported duration (or an estimate from the
//! payload size) and then reports `Ended`. `stop` aborts the pending
//! report.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::voice::{AudioBlob, TurnGeneration};
use crate::ports::{AudioPlayer, PlaybackError, PlaybackEvent, PlaybackListener};

/// Rough mp3 byte rate at 128 kbps.
const BYTES_PER_MS: u64 = 16;
const MAX_SIMULATED_MS: u64 = 8_000;

#[derive(Clone, Default)]
pub struct ConsolePlayer {
    listener: Arc<Mutex<Option<PlaybackListener>>>,
    current: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ConsolePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn simulated_duration(audio: &AudioBlob) -> Duration {
        let ms = audio
            .duration_ms
            .unwrap_or(audio.len() as u64 / BYTES_PER_MS)
            .min(MAX_SIMULATED_MS);
        Duration::from_millis(ms)
    }
}

#[async_trait]
impl AudioPlayer for ConsolePlayer {
    async fn play(&self, audio: AudioBlob, generation: TurnGeneration) -> Result<(), PlaybackError> {
        self.stop();
        let duration = Self::simulated_duration(&audio);
        let listener = self.listener.lock().unwrap_or_else(|e| e.into_inner()).clone();
        debug!(bytes = audio.len(), ms = duration.as_millis() as u64, %generation, "Simulating playback");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(listener) = listener {
                listener(PlaybackEvent::Ended { generation });
            }
        });
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        if let Some(handle) = self.current.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }

    fn set_listener(&self, listener: PlaybackListener) {
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }
}
