//! Text payload recognizer.
//!
//! Accepts `text/plain` blobs (typed input from the console or a kiosk
//! keyboard) and guesses the language from common stopwords. Used as the
//! offline fallback behind a remote speech-to-text service.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::domain::voice::AudioBlob;
use crate::ports::{RecognitionError, SpeechRecognizer, Transcription};

pub const TEXT_MIME: &str = "text/plain";

static SPANISH_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "hola", "que", "qué", "de", "el", "la", "los", "las", "y", "es", "en", "por", "para", "con",
        "quiero", "necesito", "gracias", "sí", "si", "como", "cómo", "cuánto", "cuanto", "mi",
        "empresa", "tengo", "somos", "buenos", "días", "tardes", "nosotros", "una", "un",
    ]
    .into_iter()
    .collect()
});

static ENGLISH_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "hello", "hi", "the", "and", "is", "are", "what", "how", "much", "i", "we", "my", "our",
        "need", "want", "thanks", "thank", "you", "yes", "for", "with", "company", "have", "a",
        "an", "to", "of", "it", "this", "that",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Default)]
pub struct TextPayloadRecognizer;

impl TextPayloadRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Stopword vote. Ties and texts without stopwords yield `None`.
    pub fn guess_language(text: &str) -> Option<&'static str> {
        let (mut es, mut en) = (0usize, 0usize);
        for word in text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
        {
            if SPANISH_WORDS.contains(word.as_str()) {
                es += 1;
            }
            if ENGLISH_WORDS.contains(word.as_str()) {
                en += 1;
            }
        }
        match es.cmp(&en) {
            std::cmp::Ordering::Greater => Some("es"),
            std::cmp::Ordering::Less => Some("en"),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for TextPayloadRecognizer {
    async fn recognize(&self, audio: &AudioBlob) -> Result<Transcription, RecognitionError> {
        if !audio.mime.starts_with(TEXT_MIME) {
            return Err(RecognitionError::UnsupportedFormat(audio.mime.clone()));
        }
        let text = String::from_utf8(audio.bytes.clone())
            .map_err(|e| RecognitionError::UnsupportedFormat(e.to_string()))?;
        let text = text.trim().to_string();

        let transcription = match Self::guess_language(&text) {
            Some(code) => Transcription::new(text).with_language(code),
            None => Transcription::new(text),
        };
        Ok(transcription)
    }

    fn name(&self) -> &str {
        "text"
    }
}
