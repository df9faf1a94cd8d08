//! Interaction Observer Port - UI-facing notifications.
//!
//! All methods have no-op defaults; implementors override what they show.

use crate::domain::language::Language;
use crate::domain::voice::{InteractionError, InteractionState};

pub trait InteractionObserver: Send + Sync {
    fn on_state_changed(&self, _from: InteractionState, _to: InteractionState) {}

    /// A significant transcript was accepted for this turn.
    fn on_transcript(&self, _text: &str, _language: Language) {}

    /// Text shown (and usually spoken) by the robot.
    fn on_response(&self, _text: &str, _language: Language) {}

    /// Fatal or rate-limit errors, with the original error.
    fn on_error(&self, _error: &InteractionError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl InteractionObserver for NoopObserver {}
