//! Fallback Recognizer - primary service with an automatic local fallback.
//!
//! Any primary failure is retried once on the fallback. Only when both fail
//! does the caller see an error, carrying both causes.
//!
//! # Example
//!
//! ```ignore
//! let recognizer = FallbackRecognizer::new(remote_stt, TextPayloadRecognizer::new());
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::domain::voice::AudioBlob;
use crate::ports::{RecognitionError, SpeechRecognizer, Transcription};

pub struct FallbackRecognizer<P: SpeechRecognizer, F: SpeechRecognizer> {
    primary: P,
    fallback: F,
    fallbacks_used: AtomicU64,
}

impl<P: SpeechRecognizer, F: SpeechRecognizer> FallbackRecognizer<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            fallbacks_used: AtomicU64::new(0),
        }
    }

    /// Number of requests served by the fallback so far.
    pub fn fallbacks_used(&self) -> u64 {
        self.fallbacks_used.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<P, F> SpeechRecognizer for FallbackRecognizer<P, F>
where
    P: SpeechRecognizer + 'static,
    F: SpeechRecognizer + 'static,
{
    async fn recognize(&self, audio: &AudioBlob) -> Result<Transcription, RecognitionError> {
        match self.primary.recognize(audio).await {
            Ok(transcription) => Ok(transcription),
            Err(primary_err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %primary_err,
                    "Primary recognizer failed, using fallback"
                );
                self.fallbacks_used.fetch_add(1, Ordering::Relaxed);

                match self.fallback.recognize(audio).await {
                    Ok(transcription) => {
                        debug!(chars = transcription.text.len(), "Fallback recognizer succeeded");
                        Ok(transcription)
                    }
                    Err(fallback_err) => Err(RecognitionError::AllFailed {
                        primary: primary_err.to_string(),
                        fallback: fallback_err.to_string(),
                    }),
                }
            }
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
