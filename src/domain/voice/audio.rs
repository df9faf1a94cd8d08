//! Opaque audio payload passed between recorder, recognizer and player.

use std::fmt;

#[derive(Clone, PartialEq, Eq, Default)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Duration if the producer knows it.
    pub duration_ms: Option<u64>,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            duration_ms: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

// Payloads can be large; print the size only.
impl fmt::Debug for AudioBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBlob")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}
