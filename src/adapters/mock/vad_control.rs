//! Voice activity control that records profile switches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::voice::VadProfile;
use crate::ports::VoiceActivityControl;

#[derive(Debug, Clone, Default)]
pub struct MockVadControl {
    profiles: Arc<Mutex<Vec<VadProfile>>>,
    paused: Arc<AtomicBool>,
}

impl MockVadControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> Vec<VadProfile> {
        guard(&self.profiles).clone()
    }

    pub fn current_profile(&self) -> Option<VadProfile> {
        guard(&self.profiles).last().copied()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl VoiceActivityControl for MockVadControl {
    fn apply_profile(&self, profile: VadProfile) {
        guard(&self.profiles).push(profile);
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }
}
