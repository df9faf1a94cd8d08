//! Phases of the sales conversation funnel.
//!
//! Phases guide what the avatar tries to achieve with each reply. They flow
//! roughly greeting → discovery → qualification → presentation → booking →
//! farewell, with objection handling reachable from the middle of the
//! funnel and farewell reachable from everywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Welcome the visitor and learn who they are.
    #[default]
    Greeting,
    /// Understand the visitor's business and needs.
    Discovery,
    /// Check fit: role, size, budget, timeline.
    Qualification,
    /// Explain how the product solves the stated needs.
    Presentation,
    /// Address doubts about price, timing or competitors.
    ObjectionHandling,
    /// Get a meeting on the calendar.
    Booking,
    /// Close the conversation politely.
    Farewell,
}

impl ConversationPhase {
    pub const ALL: [ConversationPhase; 7] = [
        Self::Greeting,
        Self::Discovery,
        Self::Qualification,
        Self::Presentation,
        Self::ObjectionHandling,
        Self::Booking,
        Self::Farewell,
    ];

    /// Returns the primary directive injected into the system prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Greeting => "Greet the visitor warmly and ask for their name and company.",
            Self::Discovery => {
                "Ask open questions about their business, current process and main challenges."
            }
            Self::Qualification => {
                "Find out their role, company size, budget and timeline without sounding like a form."
            }
            Self::Presentation => {
                "Explain concisely how our solution addresses the needs they mentioned."
            }
            Self::ObjectionHandling => {
                "Acknowledge the concern, answer it honestly and check whether it is resolved."
            }
            Self::Booking => "Propose a short meeting and collect an email to send the invite.",
            Self::Farewell => "Thank the visitor, summarize next steps and say goodbye.",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Discovery => "discovery",
            Self::Qualification => "qualification",
            Self::Presentation => "presentation",
            Self::ObjectionHandling => "objection_handling",
            Self::Booking => "booking",
            Self::Farewell => "farewell",
        }
    }
}

impl StateMachine for ConversationPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            Greeting => vec![Discovery, Farewell],
            Discovery => vec![Qualification, Presentation, ObjectionHandling, Farewell],
            Qualification => vec![Presentation, ObjectionHandling, Booking, Farewell],
            Presentation => vec![ObjectionHandling, Booking, Qualification, Farewell],
            ObjectionHandling => vec![Presentation, Booking, Qualification, Farewell],
            Booking => vec![ObjectionHandling, Farewell],
            Farewell => vec![],
        }
    }
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod phase_basics {
        use super::*;

        #[test]
        fn default_phase_is_greeting() {
            assert_eq!(ConversationPhase::default(), ConversationPhase::Greeting);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&ConversationPhase::ObjectionHandling).unwrap();
            assert_eq!(json, "\"objection_handling\"");
        }

        #[test]
        fn all_phases_have_directives() {
            for phase in ConversationPhase::ALL {
                assert!(!phase.directive().is_empty());
            }
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn greeting_cannot_jump_to_booking() {
            assert!(ConversationPhase::Greeting
                .transition_to(ConversationPhase::Booking)
                .is_err());
        }

        #[test]
        fn every_phase_but_farewell_can_say_goodbye() {
            for phase in ConversationPhase::ALL {
                if phase != ConversationPhase::Farewell {
                    assert!(phase.can_transition_to(&ConversationPhase::Farewell));
                }
            }
        }

        #[test]
        fn farewell_is_terminal() {
            assert!(ConversationPhase::Farewell.is_terminal());
        }

        #[test]
        fn no_phase_transitions_to_itself() {
            for phase in ConversationPhase::ALL {
                assert!(!phase.can_transition_to(&phase));
            }
        }

        #[test]
        fn objection_handling_returns_to_presentation() {
            assert_eq!(
                ConversationPhase::ObjectionHandling.transition_to(ConversationPhase::Presentation),
                Ok(ConversationPhase::Presentation)
            );
        }
    }
}
