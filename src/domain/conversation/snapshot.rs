//! Lead snapshots handed to the capture sink.

use serde::Serialize;

use super::context::ConversationContext;
use super::lead::LeadData;
use super::phase::ConversationPhase;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureReason {
    /// New lead fields were extracted mid-conversation.
    LeadUpdated,
    SessionEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSnapshot {
    pub session_id: SessionId,
    pub reason: CaptureReason,
    pub lead: LeadData,
    pub turn_count: u32,
    pub phase: ConversationPhase,
    pub language: Language,
    pub session_duration_ms: u64,
    pub captured_at: Timestamp,
}

impl LeadSnapshot {
    pub fn from_context(
        session_id: SessionId,
        reason: CaptureReason,
        context: &ConversationContext,
        turn_count: u32,
        session_duration_ms: u64,
    ) -> Self {
        Self {
            session_id,
            reason,
            lead: context.lead_data.clone(),
            turn_count,
            phase: context.phase,
            language: context.confirmed_language(),
            session_duration_ms,
            captured_at: Timestamp::now(),
        }
    }
}
