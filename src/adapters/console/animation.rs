//! Animation port that logs gestures.

use tracing::info;

use crate::domain::voice::Animation;
use crate::ports::AnimationPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAnimation;

impl ConsoleAnimation {
    fn log(animation: Animation) {
        info!(animation = animation.name(), "Avatar animation");
    }
}

impl AnimationPort for ConsoleAnimation {
    fn start_waving(&self) {
        Self::log(Animation::Waving);
    }

    fn nod_yes(&self) {
        Self::log(Animation::NodYes);
    }

    fn start_thinking(&self) {
        Self::log(Animation::StartThinking);
    }

    fn stop_thinking(&self) {
        Self::log(Animation::StopThinking);
    }

    fn start_excited(&self) {
        Self::log(Animation::Excited);
    }

    fn start_confused(&self) {
        Self::log(Animation::Confused);
    }

    fn start_goodbye(&self) {
        Self::log(Animation::Goodbye);
    }

    fn step_backward(&self) {
        Self::log(Animation::StepBackward);
    }

    fn approach_camera(&self) {
        Self::log(Animation::ApproachCamera);
    }

    fn dance_move(&self) {
        Self::log(Animation::DanceMove);
    }

    fn shake_legs_twist(&self) {
        Self::log(Animation::ShakeLegsTwist);
    }
}
