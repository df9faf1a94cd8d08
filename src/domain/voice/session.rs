//! Conversation session record and lifecycle events.

use serde::Serialize;
use std::fmt;

use super::state::InteractionState;
use crate::domain::foundation::{SessionId, Timestamp};

/// Lifetime record of one visitor conversation.
///
/// `speaking_start_time` is set only while the robot is speaking.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConversationSession {
    pub id: Option<SessionId>,
    pub is_active: bool,
    pub session_start_time: Option<Timestamp>,
    pub last_activity_time: Option<Timestamp>,
    pub turn_count: u32,
    pub speaking_start_time: Option<Timestamp>,
}

impl ConversationSession {
    pub fn started(id: SessionId, now: Timestamp) -> Self {
        Self {
            id: Some(id),
            is_active: true,
            session_start_time: Some(now),
            last_activity_time: Some(now),
            turn_count: 0,
            speaking_start_time: None,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking_start_time.is_some()
    }

    /// Checks the speaking invariant against the interaction state.
    pub fn is_consistent_with(&self, state: InteractionState) -> bool {
        self.is_speaking() == (state == InteractionState::Speaking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    Started { session_id: SessionId },
    /// No activity for the idle timeout. The session is already ended.
    IdleTimeout,
    /// No speech while listening.
    ListenTimeout,
    /// Hard cap reached. The owner decides how to wind down.
    MaxDurationReached,
    Ended { session_id: SessionId, turn_count: u32 },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Started { .. } => "session_started",
            Self::IdleTimeout => "idle_timeout",
            Self::ListenTimeout => "listen_timeout",
            Self::MaxDurationReached => "max_duration_reached",
            Self::Ended { .. } => "session_ended",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_not_speaking() {
        let session = ConversationSession::started(SessionId::new(), Timestamp::now());
        assert!(session.is_active);
        assert_eq!(session.turn_count, 0);
        assert!(session.is_consistent_with(InteractionState::Listening));
        assert!(!session.is_consistent_with(InteractionState::Speaking));
    }

    #[test]
    fn event_names() {
        assert_eq!(SessionEvent::IdleTimeout.to_string(), "idle_timeout");
        assert_eq!(SessionEvent::MaxDurationReached.to_string(), "max_duration_reached");
    }
}
