//! Conversation domain module.
//!
//! The sales funnel side of the avatar: phases, lead capture, the agent
//! state tracker that owns the conversation context, and system prompt
//! construction.

mod context;
mod engine;
mod extractor;
mod history;
mod lead;
mod phase;
mod prompt;
mod snapshot;
mod tracker;
mod utterances;

pub use context::ConversationContext;
pub use engine::{
    ConversationSnapshot, ObjectionSignal, PhaseSuggestion, PhaseTransitionConfig,
    PhaseTransitionEngine,
};
pub use extractor::LeadExtractor;
pub use history::{DialogueHistory, DialogueMessage, MessageRole, DEFAULT_MAX_HISTORY_MESSAGES};
pub use lead::LeadData;
pub use phase::ConversationPhase;
pub use prompt::{PromptCache, PromptPersona, SystemPromptBuilder};
pub use snapshot::{CaptureReason, LeadSnapshot};
pub use tracker::{AgentStateTracker, TrackerSettings, TurnAnalysis};
pub use utterances::CannedUtterance;
