//! Application layer - session lifetime, the interaction state machine and
//! the task that drives it.
//!
//! - `session` - session timers and speaking bookkeeping
//! - `orchestrator` - event dispatch for one conversation at a time
//! - `runtime` - single-consumer event loop around the orchestrator

pub mod orchestrator;
pub mod runtime;
pub mod session;

pub use orchestrator::{
    DispatchResult, InteractionEvent, InteractionOrchestrator, OrchestratorSettings, VoicePorts,
};
pub use runtime::{VoiceLoop, VoiceLoopError, VoiceLoopHandle};
pub use session::{SessionListener, SessionManager, SessionSettings};
