//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `language` - Supported languages, noise guard and debounced language switching
//! - `conversation` - Sales funnel phases, lead capture, agent state tracker, prompts
//! - `voice` - Interaction state, VAD types, pause classification, animation gating

pub mod conversation;
pub mod foundation;
pub mod language;
pub mod voice;
