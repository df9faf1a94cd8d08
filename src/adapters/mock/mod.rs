//! In-memory adapters for tests and offline runs.
//!
//! Each mock is cheap to clone; clones share state so a test can keep a
//! handle for assertions after handing one to the orchestrator.
//!
//! # Example
//!
//! ```ignore
//! let dialogue = MockDialogueClient::new().with_reply("Claro, te cuento.");
//! let player = MockAudioPlayer::new();
//! // ... drive the orchestrator ...
//! assert_eq!(dialogue.call_count(), 1);
//! player.emit_ended(player.last_generation().unwrap());
//! ```

mod animation;
mod dialogue;
mod lead_sink;
mod observer;
mod player;
mod recognizer;
mod recorder;
mod vad_control;

pub use animation::RecordingAnimationPort;
pub use dialogue::{DialogueCall, MockDialogueClient};
pub use lead_sink::MockLeadSink;
pub use observer::RecordingObserver;
pub use player::MockAudioPlayer;
pub use recognizer::MockRecognizer;
pub use recorder::MockRecorder;
pub use vad_control::MockVadControl;

use std::sync::{Mutex, MutexGuard};

/// Poisoned mocks keep working; a panicking test already failed.
fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
