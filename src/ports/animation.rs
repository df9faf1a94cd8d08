//! Animation Port - fire-and-forget avatar gestures.
//!
//! Calls never block and never fail from the caller's point of view. Rate
//! limiting is the caller's responsibility (see `AnimationGate`).

use crate::domain::voice::Animation;

pub trait AnimationPort: Send + Sync {
    fn start_waving(&self);
    fn nod_yes(&self);
    fn start_thinking(&self);
    fn stop_thinking(&self);
    fn start_excited(&self);
    fn start_confused(&self);
    fn start_goodbye(&self);
    fn step_backward(&self);
    fn approach_camera(&self);
    fn dance_move(&self);
    fn shake_legs_twist(&self);

    /// Dispatches a gesture value to the matching call.
    fn perform(&self, animation: Animation) {
        match animation {
            Animation::Waving => self.start_waving(),
            Animation::NodYes => self.nod_yes(),
            Animation::StartThinking => self.start_thinking(),
            Animation::StopThinking => self.stop_thinking(),
            Animation::Excited => self.start_excited(),
            Animation::Confused => self.start_confused(),
            Animation::Goodbye => self.start_goodbye(),
            Animation::StepBackward => self.step_backward(),
            Animation::ApproachCamera => self.approach_camera(),
            Animation::DanceMove => self.dance_move(),
            Animation::ShakeLegsTwist => self.shake_legs_twist(),
        }
    }
}
