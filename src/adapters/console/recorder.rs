//! Recorder fed with typed text.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::adapters::recognizer::TEXT_MIME;
use crate::domain::voice::AudioBlob;
use crate::ports::{AudioRecorder, RecorderError};

/// `stage` sets what the next `stop` returns, as a `text/plain` blob.
#[derive(Debug, Clone, Default)]
pub struct ConsoleRecorder {
    staged: Arc<Mutex<Option<String>>>,
    recording: Arc<AtomicBool>,
}

impl ConsoleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, text: impl Into<String>) {
        *self.staged.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.into());
    }
}

#[async_trait]
impl AudioRecorder for ConsoleRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<AudioBlob, RecorderError> {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return Err(RecorderError::NotRecording);
        }
        let text = self
            .staged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .unwrap_or_default();
        Ok(AudioBlob::new(text.into_bytes(), TEXT_MIME))
    }

    fn cancel(&self) {
        self.recording.store(false, Ordering::SeqCst);
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}
