//! VAD Engine Port - one interface over interchangeable detectors.
//!
//! Engines are driven frame by frame by whoever owns the audio stream.
//! Frames are mono `f32` samples in [-1, 1] at the configured sample rate,
//! stamped with their offset from stream start.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::voice::{VadConfig, VadEvent, VadProfile, VadState};

pub type VadListener = Arc<dyn Fn(&VadEvent) + Send + Sync>;

pub trait VadEngine: Send {
    fn start(&mut self) -> Result<(), VadError>;

    fn stop(&mut self);

    /// Analyses one frame. Returned events were also sent to listeners.
    fn process_frame(&mut self, samples: &[f32], at: Duration) -> Vec<VadEvent>;

    fn set_threshold(&mut self, threshold: f32);

    /// Swaps all thresholds at runtime without restarting.
    fn update_config(&mut self, config: VadConfig);

    fn config(&self) -> &VadConfig;

    fn state(&self) -> VadState;

    /// Restarts ambient noise measurement.
    fn recalibrate(&mut self);

    fn on_event(&mut self, listener: VadListener);

    fn name(&self) -> &'static str;
}

/// Narrow control surface the orchestrator uses on the live detector.
pub trait VoiceActivityControl: Send + Sync {
    fn apply_profile(&self, profile: VadProfile);

    /// Stops emitting events without releasing the stream.
    fn pause(&self);

    fn resume(&self);
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VadError {
    /// The requested engine cannot run in this environment.
    #[error("VAD engine '{engine}' unsupported: {reason}")]
    Unsupported { engine: &'static str, reason: String },

    #[error("VAD construction failed: {0}")]
    Construction(String),

    #[error("VAD start failed: {0}")]
    Start(String),
}

impl VadError {
    pub fn unsupported(engine: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            engine,
            reason: reason.into(),
        }
    }
}
