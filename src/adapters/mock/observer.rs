//! Observer that records every notification.

use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::language::Language;
use crate::domain::voice::{InteractionError, InteractionState};
use crate::ports::InteractionObserver;

#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    transitions: Arc<Mutex<Vec<(InteractionState, InteractionState)>>>,
    transcripts: Arc<Mutex<Vec<(String, Language)>>>,
    responses: Arc<Mutex<Vec<(String, Language)>>>,
    errors: Arc<Mutex<Vec<InteractionError>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(InteractionState, InteractionState)> {
        guard(&self.transitions).clone()
    }

    /// Visited states in order, starting with the first `from`.
    pub fn state_path(&self) -> Vec<InteractionState> {
        let transitions = guard(&self.transitions);
        let mut path: Vec<InteractionState> = transitions.first().map(|(f, _)| *f).into_iter().collect();
        path.extend(transitions.iter().map(|(_, to)| *to));
        path
    }

    pub fn transcripts(&self) -> Vec<(String, Language)> {
        guard(&self.transcripts).clone()
    }

    pub fn responses(&self) -> Vec<(String, Language)> {
        guard(&self.responses).clone()
    }

    pub fn errors(&self) -> Vec<InteractionError> {
        guard(&self.errors).clone()
    }
}

impl InteractionObserver for RecordingObserver {
    fn on_state_changed(&self, from: InteractionState, to: InteractionState) {
        guard(&self.transitions).push((from, to));
    }

    fn on_transcript(&self, text: &str, language: Language) {
        guard(&self.transcripts).push((text.to_string(), language));
    }

    fn on_response(&self, text: &str, language: Language) {
        guard(&self.responses).push((text.to_string(), language));
    }

    fn on_error(&self, error: &InteractionError) {
        guard(&self.errors).push(error.clone());
    }
}
