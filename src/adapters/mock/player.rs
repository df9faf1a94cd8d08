//! Mock audio output. Playback never ends on its own; tests call
//! `emit_ended` to simulate completion.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::voice::{AudioBlob, TurnGeneration};
use crate::ports::{AudioPlayer, PlaybackError, PlaybackEvent, PlaybackListener};

#[derive(Clone, Default)]
pub struct MockAudioPlayer {
    plays: Arc<Mutex<Vec<(AudioBlob, TurnGeneration)>>>,
    listener: Arc<Mutex<Option<PlaybackListener>>>,
    play_error: Arc<Mutex<Option<PlaybackError>>>,
    stops: Arc<AtomicUsize>,
}

impl MockAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_play_error(self, error: PlaybackError) -> Self {
        *guard(&self.play_error) = Some(error);
        self
    }

    pub fn play_count(&self) -> usize {
        guard(&self.plays).len()
    }

    pub fn last_generation(&self) -> Option<TurnGeneration> {
        guard(&self.plays).last().map(|(_, generation)| *generation)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Reports completion of audio started under `generation`.
    pub fn emit_ended(&self, generation: TurnGeneration) {
        self.emit(PlaybackEvent::Ended { generation });
    }

    pub fn emit_failed(&self, generation: TurnGeneration, reason: &str) {
        self.emit(PlaybackEvent::Failed {
            generation,
            reason: reason.to_string(),
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        let listener = guard(&self.listener).clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }
}

impl std::fmt::Debug for MockAudioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAudioPlayer")
            .field("plays", &self.play_count())
            .field("stops", &self.stop_count())
            .finish()
    }
}

#[async_trait]
impl AudioPlayer for MockAudioPlayer {
    async fn play(&self, audio: AudioBlob, generation: TurnGeneration) -> Result<(), PlaybackError> {
        if let Some(err) = guard(&self.play_error).clone() {
            return Err(err);
        }
        guard(&self.plays).push((audio, generation));
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn set_listener(&self, listener: PlaybackListener) {
        *guard(&self.listener) = Some(listener);
    }
}
