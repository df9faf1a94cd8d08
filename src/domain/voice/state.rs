//! Interaction state owned by the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Exactly one value at a time. Only the orchestrator mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionState {
    #[default]
    Idle,
    /// Waiting for the visitor to start speaking.
    Listening,
    /// Speech detected, recording in progress.
    ListeningActive,
    /// Transcription and dialogue pipeline running.
    Processing,
    /// Robot response playing.
    Speaking,
    Error,
}

impl InteractionState {
    /// True for both listening states.
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listening | Self::ListeningActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Listening => "LISTENING",
            Self::ListeningActive => "LISTENING_ACTIVE",
            Self::Processing => "PROCESSING",
            Self::Speaking => "SPEAKING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for InteractionState {
    fn valid_transitions(&self) -> Vec<Self> {
        use InteractionState::*;
        match self {
            // The session greeting is spoken straight from Idle.
            Idle => vec![Listening, Speaking],
            Listening => vec![ListeningActive, Idle, Error],
            ListeningActive => vec![Processing, Listening, Idle, Error],
            Processing => vec![Speaking, Listening, Idle, Error],
            // Barge-in goes straight to ListeningActive.
            Speaking => vec![Listening, ListeningActive, Idle, Error],
            Error => vec![Listening, Idle],
        }
    }
}

/// Monotonic counter identifying the current conversational turn.
///
/// Every asynchronous completion carries the generation it was started
/// under; completions from an older generation are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TurnGeneration(u64);

impl TurnGeneration {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for TurnGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod transitions {
        use super::*;

        #[test]
        fn idle_starts_listening_or_greets() {
            assert_eq!(
                InteractionState::Idle.valid_transitions(),
                vec![InteractionState::Listening, InteractionState::Speaking]
            );
            assert!(InteractionState::Idle
                .transition_to(InteractionState::Processing)
                .is_err());
            assert!(InteractionState::Idle
                .transition_to(InteractionState::Error)
                .is_err());
        }

        #[test]
        fn speaking_can_be_interrupted_into_recording() {
            assert!(InteractionState::Speaking.can_transition_to(&InteractionState::ListeningActive));
        }

        #[test]
        fn error_recovers_through_listening_or_idle() {
            assert!(InteractionState::Error.can_transition_to(&InteractionState::Listening));
            assert!(InteractionState::Error.can_transition_to(&InteractionState::Idle));
            assert!(!InteractionState::Error.can_transition_to(&InteractionState::Processing));
        }

        #[test]
        fn no_state_is_terminal() {
            for state in [
                InteractionState::Idle,
                InteractionState::Listening,
                InteractionState::ListeningActive,
                InteractionState::Processing,
                InteractionState::Speaking,
                InteractionState::Error,
            ] {
                assert!(!state.is_terminal(), "{} should not be terminal", state);
            }
        }
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(InteractionState::ListeningActive.to_string(), "LISTENING_ACTIVE");
        let json = serde_json::to_string(&InteractionState::ListeningActive).unwrap();
        assert_eq!(json, "\"LISTENING_ACTIVE\"");
    }

    #[test]
    fn generation_increments() {
        let g = TurnGeneration::default();
        assert_eq!(g.next().value(), 1);
        assert!(g.next() > g);
    }
}
