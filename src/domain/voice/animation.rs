//! Avatar gestures, the weighted response choice and the cooldown gate.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    Waving,
    NodYes,
    StartThinking,
    StopThinking,
    Excited,
    Confused,
    Goodbye,
    StepBackward,
    ApproachCamera,
    DanceMove,
    ShakeLegsTwist,
}

impl Animation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Waving => "waving",
            Self::NodYes => "nod_yes",
            Self::StartThinking => "start_thinking",
            Self::StopThinking => "stop_thinking",
            Self::Excited => "excited",
            Self::Confused => "confused",
            Self::Goodbye => "goodbye",
            Self::StepBackward => "step_backward",
            Self::ApproachCamera => "approach_camera",
            Self::DanceMove => "dance_move",
            Self::ShakeLegsTwist => "shake_legs_twist",
        }
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gesture played when the robot starts answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseAnimation {
    Nod,
    Wave,
    Excited,
    None,
}

impl ResponseAnimation {
    /// Weights sum to 100.
    pub const WEIGHTS: [(ResponseAnimation, u32); 4] = [
        (ResponseAnimation::Nod, 50),
        (ResponseAnimation::Wave, 20),
        (ResponseAnimation::Excited, 15),
        (ResponseAnimation::None, 15),
    ];

    /// Waving is only natural at the start of a conversation.
    pub const MAX_WAVE_TURN: u32 = 3;

    /// Draws from the weighted distribution. `Wave` after the first
    /// `MAX_WAVE_TURN` turns becomes `Nod`.
    pub fn choose(rng: &mut dyn RngCore, turn_count: u32) -> Self {
        let total: u32 = Self::WEIGHTS.iter().map(|(_, w)| w).sum();
        let mut roll = rng.gen_range(0..total);
        let mut picked = ResponseAnimation::Nod;
        for (candidate, weight) in Self::WEIGHTS {
            if roll < weight {
                picked = candidate;
                break;
            }
            roll -= weight;
        }

        if picked == ResponseAnimation::Wave && turn_count >= Self::MAX_WAVE_TURN {
            ResponseAnimation::Nod
        } else {
            picked
        }
    }

    pub fn animation(&self) -> Option<Animation> {
        match self {
            Self::Nod => Some(Animation::NodYes),
            Self::Wave => Some(Animation::Waving),
            Self::Excited => Some(Animation::Excited),
            Self::None => None,
        }
    }
}

/// Cooldown gate shared by all animation triggers.
#[derive(Debug, Clone)]
pub struct AnimationGate {
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl AnimationGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Claims the gate if the cooldown has elapsed.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let ready = self
            .last_fired
            .map_or(true, |last| now.saturating_duration_since(last) >= self.cooldown);
        if ready {
            self.last_fired = Some(now);
        }
        ready
    }

    /// Records a firing that bypassed the cooldown.
    pub fn force(&mut self, now: Instant) {
        self.last_fired = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    mod response_choice {
        use super::*;

        #[test]
        fn seeded_rng_is_deterministic() {
            let mut a = StdRng::seed_from_u64(7);
            let mut b = StdRng::seed_from_u64(7);
            for turn in 0..20 {
                assert_eq!(
                    ResponseAnimation::choose(&mut a, turn),
                    ResponseAnimation::choose(&mut b, turn)
                );
            }
        }

        #[test]
        fn never_waves_after_third_turn() {
            let mut rng = StdRng::seed_from_u64(1);
            for _ in 0..2000 {
                assert_ne!(ResponseAnimation::choose(&mut rng, 3), ResponseAnimation::Wave);
            }
        }

        #[test]
        fn distribution_roughly_matches_weights() {
            let mut rng = StdRng::seed_from_u64(42);
            let mut counts: HashMap<ResponseAnimation, u32> = HashMap::new();
            let draws = 10_000;
            for _ in 0..draws {
                *counts.entry(ResponseAnimation::choose(&mut rng, 0)).or_default() += 1;
            }
            let share = |a| counts.get(&a).copied().unwrap_or(0) as f64 / draws as f64;
            assert!((share(ResponseAnimation::Nod) - 0.50).abs() < 0.03);
            assert!((share(ResponseAnimation::Wave) - 0.20).abs() < 0.03);
            assert!((share(ResponseAnimation::Excited) - 0.15).abs() < 0.03);
            assert!((share(ResponseAnimation::None) - 0.15).abs() < 0.03);
        }

        #[test]
        fn later_turns_fold_wave_into_nod() {
            let mut rng = StdRng::seed_from_u64(42);
            let draws = 10_000;
            let nods = (0..draws)
                .filter(|_| ResponseAnimation::choose(&mut rng, 10) == ResponseAnimation::Nod)
                .count();
            let share = nods as f64 / draws as f64;
            assert!((share - 0.70).abs() < 0.03);
        }
    }

    mod gate {
        use super::*;

        #[test]
        fn blocks_within_cooldown() {
            let mut gate = AnimationGate::new(Duration::from_millis(800));
            let t0 = Instant::now();
            assert!(gate.try_acquire(t0));
            assert!(!gate.try_acquire(t0 + Duration::from_millis(300)));
            assert!(gate.try_acquire(t0 + Duration::from_millis(800)));
        }

        #[test]
        fn force_restarts_cooldown() {
            let mut gate = AnimationGate::new(Duration::from_millis(800));
            let t0 = Instant::now();
            gate.force(t0);
            assert!(!gate.try_acquire(t0 + Duration::from_millis(100)));
        }

        #[test]
        fn reset_opens_gate() {
            let mut gate = AnimationGate::new(Duration::from_millis(800));
            let t0 = Instant::now();
            gate.force(t0);
            gate.reset();
            assert!(gate.try_acquire(t0));
        }
    }
}
