//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the orchestration core to external systems:
//! - `openai` - Dialogue, speech synthesis and transcription over HTTP
//! - `recognizer` - Fallback chaining and the typed-text recognizer
//! - `vad` - RMS and model-based voice activity detection
//! - `console` - Terminal stand-ins for microphone, speaker and avatar
//! - `mock` - In-memory implementations for tests

pub mod console;
pub mod mock;
pub mod openai;
pub mod recognizer;
pub mod vad;

pub use openai::{OpenAiConfig, OpenAiDialogueClient, OpenAiTranscriber};
pub use recognizer::{FallbackRecognizer, TextPayloadRecognizer};
pub use vad::{create_vad_engine, SharedVad, VadSelection};
