//! Lead Capture Sink Port - where captured visitor data goes.

use async_trait::async_trait;

use crate::domain::conversation::LeadSnapshot;

/// Invoked whenever new lead fields are extracted and at session end.
///
/// Failures are logged by the caller and never interrupt the conversation.
#[async_trait]
pub trait LeadCaptureSink: Send + Sync {
    async fn on_lead_captured(&self, snapshot: LeadSnapshot) -> Result<(), LeadSinkError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeadSinkError {
    #[error("lead sink unavailable: {0}")]
    Unavailable(String),

    #[error("lead rejected: {0}")]
    Rejected(String),
}
