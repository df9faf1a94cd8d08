//! Voice interaction domain.
//!
//! # Components
//!
//! - `InteractionState` / `TurnGeneration` - the orchestrator's state and stale-completion guard
//! - `ConversationSession` / `SessionEvent` - session record and timer events
//! - `VadConfig` / `VadState` / `VadEvent` - detector configuration and output
//! - `PauseClassifier` - silence duration to pause type and action
//! - `ResponseAnimation` / `AnimationGate` - gesture choice and cooldown
//! - `InteractionError` - error taxonomy of the loop

mod animation;
mod audio;
mod errors;
mod pause;
mod session;
mod state;
mod vad;

pub use animation::{Animation, AnimationGate, ResponseAnimation};
pub use audio::AudioBlob;
pub use errors::InteractionError;
pub use pause::{
    PauseAction, PauseClassification, PauseClassifier, PauseContext, PauseHistory, PauseThresholds,
    PauseType,
};
pub use session::{ConversationSession, SessionEvent};
pub use state::{InteractionState, TurnGeneration};
pub use vad::{VadConfig, VadEngineKind, VadEvent, VadProfile, VadState};
