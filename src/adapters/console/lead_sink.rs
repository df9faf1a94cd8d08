//! Lead sink that writes snapshots to the log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::conversation::LeadSnapshot;
use crate::ports::{LeadCaptureSink, LeadSinkError};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLeadSink;

#[async_trait]
impl LeadCaptureSink for LoggingLeadSink {
    async fn on_lead_captured(&self, snapshot: LeadSnapshot) -> Result<(), LeadSinkError> {
        let payload = serde_json::to_string(&snapshot)
            .map_err(|e| LeadSinkError::Rejected(e.to_string()))?;
        info!(
            session_id = %snapshot.session_id,
            reason = ?snapshot.reason,
            lead = %payload,
            "Lead captured"
        );
        Ok(())
    }
}
