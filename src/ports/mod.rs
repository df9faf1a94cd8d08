//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the orchestration core and the outside world. Adapters implement these
//! ports.
//!
//! ## Audio Ports
//!
//! - `AudioRecorder` - Microphone capture sessions
//! - `AudioPlayer` - Response playback with generation-tagged completion
//! - `VadEngine` - Frame-driven voice activity detection
//! - `VoiceActivityControl` - Runtime profile switching on the live detector
//!
//! ## Service Ports
//!
//! - `SpeechRecognizer` - Speech to text plus a language guess
//! - `DialogueClient` - Assistant replies and speech synthesis
//! - `LeadCaptureSink` - Captured visitor data
//!
//! ## Presentation Ports
//!
//! - `AnimationPort` - Fire-and-forget avatar gestures
//! - `InteractionObserver` - State, transcript and error notifications

mod animation;
mod dialogue;
mod lead_sink;
mod observer;
mod player;
mod recognizer;
mod recorder;
mod vad;

pub use animation::AnimationPort;
pub use dialogue::{DialogueClient, DialogueError};
pub use lead_sink::{LeadCaptureSink, LeadSinkError};
pub use observer::{InteractionObserver, NoopObserver};
pub use player::{AudioPlayer, PlaybackError, PlaybackEvent, PlaybackListener};
pub use recognizer::{RecognitionError, SpeechRecognizer, Transcription};
pub use recorder::{AudioRecorder, RecorderError};
pub use vad::{VadEngine, VadError, VadListener, VoiceActivityControl};
