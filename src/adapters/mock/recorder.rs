//! Mock microphone.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::voice::AudioBlob;
use crate::ports::{AudioRecorder, RecorderError};

/// Returns queued blobs on `stop`, or a short default clip when the queue
/// is empty.
#[derive(Debug, Clone, Default)]
pub struct MockRecorder {
    blobs: Arc<Mutex<VecDeque<AudioBlob>>>,
    start_error: Arc<Mutex<Option<RecorderError>>>,
    recording: Arc<AtomicBool>,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, blob: AudioBlob) -> Self {
        guard(&self.blobs).push_back(blob);
        self
    }

    /// Every `start` fails with `error` until cleared.
    pub fn with_start_error(self, error: RecorderError) -> Self {
        *guard(&self.start_error) = Some(error);
        self
    }

    pub fn push_blob(&self, blob: AudioBlob) {
        guard(&self.blobs).push_back(blob);
    }

    pub fn clear_start_error(&self) {
        *guard(&self.start_error) = None;
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    fn default_clip() -> AudioBlob {
        AudioBlob::new(vec![0x1a; 64], "audio/webm").with_duration_ms(1_200)
    }
}

#[async_trait]
impl AudioRecorder for MockRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        if let Some(err) = guard(&self.start_error).clone() {
            return Err(err);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<AudioBlob, RecorderError> {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return Err(RecorderError::NotRecording);
        }
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(guard(&self.blobs)
            .pop_front()
            .unwrap_or_else(Self::default_clip))
    }

    fn cancel(&self) {
        if self.recording.swap(false, Ordering::SeqCst) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}
