//! Inputs of the interaction state machine and its collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::voice::{PauseThresholds, SessionEvent, TurnGeneration, VadEvent};
use crate::ports::{
    AnimationPort, AudioPlayer, AudioRecorder, DialogueClient, InteractionObserver,
    LeadCaptureSink, PlaybackEvent, SpeechRecognizer, VoiceActivityControl,
};

/// Everything that can drive the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// Begin a conversation: approach, wave and greet.
    StartSession,
    EndSession,
    StartListening,
    /// Forces processing of whatever has been captured so far.
    StopListening,
    SpeechStarted,
    SpeechEnded { speech_ms: u64, silence_ms: u64 },
    /// The detector itself rejected the segment as too short.
    SpeechDiscarded { speech_ms: u64 },
    PlaybackEnded { generation: TurnGeneration },
    PlaybackFailed { generation: TurnGeneration, reason: String },
    /// A pause grace period scheduled by the orchestrator ran out.
    PauseGraceElapsed { token: u64 },
    Session(SessionEvent),
}

impl InteractionEvent {
    /// Maps detector output to events. Telemetry and calibration have no
    /// counterpart.
    pub fn from_vad(event: &VadEvent) -> Option<Self> {
        match *event {
            VadEvent::SpeechStart { .. } => Some(Self::SpeechStarted),
            VadEvent::SpeechEnd {
                speech_ms,
                silence_ms,
                ..
            } => Some(Self::SpeechEnded {
                speech_ms,
                silence_ms,
            }),
            VadEvent::SpeechDiscarded { speech_ms, .. } => Some(Self::SpeechDiscarded { speech_ms }),
            VadEvent::Volume { .. } | VadEvent::CalibrationComplete { .. } => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartSession => "start_session",
            Self::EndSession => "end_session",
            Self::StartListening => "start_listening",
            Self::StopListening => "stop_listening",
            Self::SpeechStarted => "speech_started",
            Self::SpeechEnded { .. } => "speech_ended",
            Self::SpeechDiscarded { .. } => "speech_discarded",
            Self::PlaybackEnded { .. } => "playback_ended",
            Self::PlaybackFailed { .. } => "playback_failed",
            Self::PauseGraceElapsed { .. } => "pause_grace_elapsed",
            Self::Session(_) => "session",
        }
    }
}

impl From<PlaybackEvent> for InteractionEvent {
    fn from(event: PlaybackEvent) -> Self {
        match event {
            PlaybackEvent::Ended { generation } => Self::PlaybackEnded { generation },
            PlaybackEvent::Failed { generation, reason } => Self::PlaybackFailed { generation, reason },
        }
    }
}

impl From<SessionEvent> for InteractionEvent {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}

/// External collaborators of the orchestrator.
#[derive(Clone)]
pub struct VoicePorts {
    pub recorder: Arc<dyn AudioRecorder>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub dialogue: Arc<dyn DialogueClient>,
    pub player: Arc<dyn AudioPlayer>,
    pub animation: Arc<dyn AnimationPort>,
    pub lead_sink: Arc<dyn LeadCaptureSink>,
    pub vad: Arc<dyn VoiceActivityControl>,
    pub observer: Arc<dyn InteractionObserver>,
}

/// Guard and pipeline tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Minimum spacing between VAD-driven transitions.
    pub vad_debounce: Duration,
    pub animation_cooldown: Duration,
    pub max_history_messages: usize,
    pub min_significant_chars: usize,
    /// Shorter speech is noise.
    pub min_speech: Duration,
    /// Classify the closing silence before processing.
    pub pause_gating: bool,
    pub pause_grace: Duration,
    pub pause_confidence_floor: f32,
    pub pause_thresholds: PauseThresholds,
    /// Speak the greeting on `StartSession`.
    pub greet_on_start: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            vad_debounce: Duration::from_millis(500),
            animation_cooldown: Duration::from_millis(800),
            max_history_messages: crate::domain::conversation::DEFAULT_MAX_HISTORY_MESSAGES,
            min_significant_chars: crate::domain::language::DEFAULT_MIN_SIGNIFICANT_CHARS,
            min_speech: Duration::from_millis(600),
            pause_gating: false,
            pause_grace: Duration::from_millis(800),
            pause_confidence_floor: 0.6,
            pause_thresholds: PauseThresholds::default(),
            greet_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_has_no_event() {
        assert_eq!(InteractionEvent::from_vad(&VadEvent::Volume { level: 0.3 }), None);
        assert_eq!(
            InteractionEvent::from_vad(&VadEvent::SpeechEnd {
                at: Duration::from_millis(900),
                speech_ms: 900,
                silence_ms: 1200,
            }),
            Some(InteractionEvent::SpeechEnded {
                speech_ms: 900,
                silence_ms: 1200
            })
        );
    }

    #[test]
    fn playback_events_keep_generation() {
        let generation = TurnGeneration::new(4);
        let event: InteractionEvent = PlaybackEvent::Ended { generation }.into();
        assert_eq!(event, InteractionEvent::PlaybackEnded { generation });
    }
}
