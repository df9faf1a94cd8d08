//! Lead sink that keeps snapshots in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::conversation::{CaptureReason, LeadSnapshot};
use crate::ports::{LeadCaptureSink, LeadSinkError};

#[derive(Debug, Clone, Default)]
pub struct MockLeadSink {
    snapshots: Arc<Mutex<Vec<LeadSnapshot>>>,
    error: Arc<Mutex<Option<LeadSinkError>>>,
}

impl MockLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(self, error: LeadSinkError) -> Self {
        *guard(&self.error) = Some(error);
        self
    }

    pub fn snapshots(&self) -> Vec<LeadSnapshot> {
        guard(&self.snapshots).clone()
    }

    pub fn count(&self, reason: CaptureReason) -> usize {
        guard(&self.snapshots)
            .iter()
            .filter(|s| s.reason == reason)
            .count()
    }

    pub fn last(&self) -> Option<LeadSnapshot> {
        guard(&self.snapshots).last().cloned()
    }
}

#[async_trait]
impl LeadCaptureSink for MockLeadSink {
    async fn on_lead_captured(&self, snapshot: LeadSnapshot) -> Result<(), LeadSinkError> {
        if let Some(err) = guard(&self.error).clone() {
            return Err(err);
        }
        guard(&self.snapshots).push(snapshot);
        Ok(())
    }
}
