//! Mock speech-to-text.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::voice::AudioBlob;
use crate::ports::{RecognitionError, SpeechRecognizer, Transcription};

/// Results are consumed in order. An exhausted queue yields empty text.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    results: Arc<Mutex<VecDeque<Result<Transcription, RecognitionError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcription(self, transcription: Transcription) -> Self {
        self.push(Ok(transcription));
        self
    }

    /// Shorthand for text with a language label.
    pub fn with_text(self, text: &str, language: &str) -> Self {
        self.with_transcription(Transcription::new(text).with_language(language))
    }

    pub fn with_error(self, error: RecognitionError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, result: Result<Transcription, RecognitionError>) {
        guard(&self.results).push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(&self, _audio: &AudioBlob) -> Result<Transcription, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        guard(&self.results)
            .pop_front()
            .unwrap_or_else(|| Ok(Transcription::default()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
