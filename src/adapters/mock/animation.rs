//! Animation port that records every gesture.

use std::sync::{Arc, Mutex};

use super::guard;
use crate::domain::voice::Animation;
use crate::ports::AnimationPort;

#[derive(Debug, Clone, Default)]
pub struct RecordingAnimationPort {
    performed: Arc<Mutex<Vec<Animation>>>,
}

impl RecordingAnimationPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn performed(&self) -> Vec<Animation> {
        guard(&self.performed).clone()
    }

    pub fn count(&self, animation: Animation) -> usize {
        guard(&self.performed)
            .iter()
            .filter(|a| **a == animation)
            .count()
    }

    pub fn clear(&self) {
        guard(&self.performed).clear();
    }

    fn record(&self, animation: Animation) {
        guard(&self.performed).push(animation);
    }
}

impl AnimationPort for RecordingAnimationPort {
    fn start_waving(&self) {
        self.record(Animation::Waving);
    }

    fn nod_yes(&self) {
        self.record(Animation::NodYes);
    }

    fn start_thinking(&self) {
        self.record(Animation::StartThinking);
    }

    fn stop_thinking(&self) {
        self.record(Animation::StopThinking);
    }

    fn start_excited(&self) {
        self.record(Animation::Excited);
    }

    fn start_confused(&self) {
        self.record(Animation::Confused);
    }

    fn start_goodbye(&self) {
        self.record(Animation::Goodbye);
    }

    fn step_backward(&self) {
        self.record(Animation::StepBackward);
    }

    fn approach_camera(&self) {
        self.record(Animation::ApproachCamera);
    }

    fn dance_move(&self) {
        self.record(Animation::DanceMove);
    }

    fn shake_legs_twist(&self) {
        self.record(Animation::ShakeLegsTwist);
    }
}
