//! Frame-level voiced/unvoiced decisions to speech segments.
//!
//! Shared by both engines so start delay, silence timeout and minimum
//! speech duration behave identically regardless of how a frame is judged.

use std::time::Duration;
use tracing::debug;

use crate::domain::voice::{VadConfig, VadEvent};

#[derive(Debug, Clone, Default)]
pub(crate) struct SpeechSegmenter {
    /// First voiced frame of a run that has not yet passed the start delay.
    candidate_start: Option<Duration>,
    speech_start: Option<Duration>,
    last_speech: Option<Duration>,
}

impl SpeechSegmenter {
    pub fn is_speaking(&self) -> bool {
        self.speech_start.is_some()
    }

    pub fn speech_start_time(&self) -> Option<Duration> {
        self.speech_start
    }

    pub fn last_speech_time(&self) -> Option<Duration> {
        self.last_speech
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn observe(
        &mut self,
        voiced: bool,
        volume: f32,
        at: Duration,
        config: &VadConfig,
    ) -> Option<VadEvent> {
        match self.speech_start {
            None => self.observe_silence_phase(voiced, volume, at, config),
            Some(start) => self.observe_speech_phase(voiced, start, at, config),
        }
    }

    fn observe_silence_phase(
        &mut self,
        voiced: bool,
        volume: f32,
        at: Duration,
        config: &VadConfig,
    ) -> Option<VadEvent> {
        if !voiced {
            self.candidate_start = None;
            return None;
        }

        let candidate = *self.candidate_start.get_or_insert(at);
        if at.saturating_sub(candidate) < config.speech_start_delay() {
            return None;
        }

        self.candidate_start = None;
        self.speech_start = Some(candidate);
        self.last_speech = Some(at);
        debug!(at_ms = at.as_millis() as u64, volume, "Speech started");
        Some(VadEvent::SpeechStart { at, volume })
    }

    fn observe_speech_phase(
        &mut self,
        voiced: bool,
        start: Duration,
        at: Duration,
        config: &VadConfig,
    ) -> Option<VadEvent> {
        if voiced {
            self.last_speech = Some(at);
            return None;
        }

        let last = self.last_speech.unwrap_or(start);
        let silence = at.saturating_sub(last);
        if silence < config.silence_timeout() {
            return None;
        }

        let speech_ms = last.saturating_sub(start).as_millis() as u64;
        self.speech_start = None;
        self.last_speech = None;

        if speech_ms < config.min_speech_duration_ms {
            debug!(speech_ms, "Speech shorter than minimum, discarded");
            Some(VadEvent::SpeechDiscarded { at, speech_ms })
        } else {
            debug!(speech_ms, silence_ms = silence.as_millis() as u64, "Speech ended");
            Some(VadEvent::SpeechEnd {
                at,
                speech_ms,
                silence_ms: silence.as_millis() as u64,
            })
        }
    }
}
