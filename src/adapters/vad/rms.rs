//! Energy threshold VAD.
//!
//! Each frame's RMS level is smoothed over a short rolling window and
//! compared with an adaptive threshold derived from a calibration pass over
//! ambient noise.
//!
//! Frames arrive as time-domain samples, so the level is the RMS of the
//! samples themselves. No FFT runs here; by Parseval it tracks the RMS of
//! the frequency-bin magnitudes up to a constant factor, which the
//! calibrated threshold absorbs.

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};

use super::segmenter::SpeechSegmenter;
use crate::domain::voice::{VadConfig, VadEvent, VadState};
use crate::ports::{VadEngine, VadError, VadListener};

const LEVEL_WINDOW: usize = 3;

pub struct RmsVad {
    config: VadConfig,
    listeners: Vec<VadListener>,
    segmenter: SpeechSegmenter,
    levels: VecDeque<f32>,
    is_listening: bool,
    current_volume: f32,
    noise_floor: f32,
    adaptive_threshold: f32,
    calibration: Option<Calibration>,
}

#[derive(Debug, Clone, Default)]
struct Calibration {
    started_at: Option<Duration>,
    sum: f32,
    frames: u32,
}

impl RmsVad {
    pub fn new(config: VadConfig) -> Result<Self, VadError> {
        config
            .validate()
            .map_err(|e| VadError::Construction(e.to_string()))?;
        Ok(Self {
            adaptive_threshold: config.volume_threshold,
            config,
            listeners: Vec::new(),
            segmenter: SpeechSegmenter::default(),
            levels: VecDeque::with_capacity(LEVEL_WINDOW),
            is_listening: false,
            current_volume: 0.0,
            noise_floor: 0.0,
            calibration: None,
        })
    }

    /// Root mean square of the frame, clamped to [0, 1].
    pub fn frame_level(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len() as f32).sqrt().min(1.0)
    }

    fn smoothed_level(&mut self, level: f32) -> f32 {
        if self.levels.len() == LEVEL_WINDOW {
            self.levels.pop_front();
        }
        self.levels.push_back(level);
        self.levels.iter().sum::<f32>() / self.levels.len() as f32
    }

    fn recompute_threshold(&mut self) {
        self.adaptive_threshold = (self.noise_floor * self.config.noise_multiplier)
            .max(self.config.volume_threshold)
            .min(1.0);
    }

    fn begin_calibration(&mut self) {
        self.calibration = if self.config.calibration_ms > 0 {
            Some(Calibration::default())
        } else {
            None
        };
    }

    /// Returns the completion event once the window has elapsed.
    fn calibrate(&mut self, level: f32, at: Duration) -> Option<VadEvent> {
        let window = self.config.calibration();
        let calibration = self.calibration.as_mut()?;
        let started = *calibration.started_at.get_or_insert(at);
        calibration.sum += level;
        calibration.frames += 1;

        if at.saturating_sub(started) < window {
            return None;
        }

        self.noise_floor = calibration.sum / calibration.frames as f32;
        self.calibration = None;
        self.recompute_threshold();
        info!(
            noise_floor = self.noise_floor,
            threshold = self.adaptive_threshold,
            "VAD calibration complete"
        );
        Some(VadEvent::CalibrationComplete {
            noise_floor: self.noise_floor,
            threshold: self.adaptive_threshold,
        })
    }

    fn emit(&self, events: &[VadEvent]) {
        for event in events {
            for listener in &self.listeners {
                listener(event);
            }
        }
    }
}

impl VadEngine for RmsVad {
    fn start(&mut self) -> Result<(), VadError> {
        self.config
            .validate()
            .map_err(|e| VadError::Start(e.to_string()))?;
        self.is_listening = true;
        self.segmenter.reset();
        self.levels.clear();
        self.begin_calibration();
        debug!(threshold = self.config.volume_threshold, "RMS VAD started");
        Ok(())
    }

    fn stop(&mut self) {
        self.is_listening = false;
        self.segmenter.reset();
        self.levels.clear();
        self.calibration = None;
        self.current_volume = 0.0;
    }

    fn process_frame(&mut self, samples: &[f32], at: Duration) -> Vec<VadEvent> {
        if !self.is_listening {
            return Vec::new();
        }

        let level = self.smoothed_level(Self::frame_level(samples));
        self.current_volume = level;
        let mut events = vec![VadEvent::Volume { level }];

        if self.calibration.is_some() {
            events.extend(self.calibrate(level, at));
        } else {
            let voiced = level > self.adaptive_threshold;
            events.extend(self.segmenter.observe(voiced, level, at, &self.config));
        }

        self.emit(&events);
        events
    }

    fn set_threshold(&mut self, threshold: f32) {
        self.config.volume_threshold = threshold.clamp(0.0, 1.0);
        self.recompute_threshold();
    }

    fn update_config(&mut self, config: VadConfig) {
        self.config = config;
        self.recompute_threshold();
    }

    fn config(&self) -> &VadConfig {
        &self.config
    }

    fn state(&self) -> VadState {
        VadState {
            is_listening: self.is_listening,
            is_speaking: self.segmenter.is_speaking(),
            current_volume: self.current_volume,
            speech_start_time: self.segmenter.speech_start_time(),
            last_speech_time: self.segmenter.last_speech_time(),
            is_calibrating: self.calibration.is_some(),
            adaptive_threshold: self.adaptive_threshold,
            noise_floor: self.noise_floor,
        }
    }

    fn recalibrate(&mut self) {
        self.segmenter.reset();
        self.begin_calibration();
    }

    fn on_event(&mut self, listener: VadListener) {
        self.listeners.push(listener);
    }

    fn name(&self) -> &'static str {
        "rms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const TICK_MS: u64 = 50;

    fn tone(amplitude: f32) -> Vec<f32> {
        (0..800)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    fn no_calibration() -> VadConfig {
        VadConfig {
            calibration_ms: 0,
            speech_start_delay_ms: 100,
            silence_timeout_ms: 300,
            min_speech_duration_ms: 600,
            ..Default::default()
        }
    }

    fn feed(vad: &mut RmsVad, from_ms: u64, to_ms: u64, amplitude: f32) -> Vec<VadEvent> {
        let frame = tone(amplitude);
        (from_ms..to_ms)
            .step_by(TICK_MS as usize)
            .flat_map(|t| vad.process_frame(&frame, Duration::from_millis(t)))
            .filter(|e| !e.is_telemetry())
            .collect()
    }

    mod levels {
        use super::*;

        #[test]
        fn frame_level_of_square_wave_is_amplitude() {
            assert!((RmsVad::frame_level(&tone(0.3)) - 0.3).abs() < 1e-4);
            assert_eq!(RmsVad::frame_level(&[]), 0.0);
        }

        #[test]
        fn stopped_engine_ignores_frames() {
            let mut vad = RmsVad::new(no_calibration()).unwrap();
            assert!(vad.process_frame(&tone(0.5), Duration::ZERO).is_empty());
        }
    }

    mod detection {
        use super::*;

        #[test]
        fn loud_speech_produces_start_and_end() {
            let mut vad = RmsVad::new(no_calibration()).unwrap();
            vad.start().unwrap();
            let mut events = feed(&mut vad, 0, 1000, 0.4);
            events.extend(feed(&mut vad, 1000, 1600, 0.0));

            assert!(matches!(events.first(), Some(VadEvent::SpeechStart { .. })));
            assert!(matches!(events.last(), Some(VadEvent::SpeechEnd { .. })));
        }

        #[test]
        fn quiet_input_stays_silent() {
            let mut vad = RmsVad::new(no_calibration()).unwrap();
            vad.start().unwrap();
            assert!(feed(&mut vad, 0, 2000, 0.01).is_empty());
        }

        #[test]
        fn raised_threshold_ignores_moderate_speech() {
            let mut vad = RmsVad::new(no_calibration()).unwrap();
            vad.start().unwrap();
            vad.set_threshold(0.6);
            assert!(feed(&mut vad, 0, 1000, 0.4).is_empty());
            assert_eq!(vad.state().adaptive_threshold, 0.6);
        }

        #[test]
        fn listeners_receive_events() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let mut vad = RmsVad::new(no_calibration()).unwrap();
            vad.on_event(Arc::new(move |e: &VadEvent| {
                if !e.is_telemetry() {
                    sink.lock().unwrap().push(e.clone());
                }
            }));
            vad.start().unwrap();
            feed(&mut vad, 0, 400, 0.4);
            assert_eq!(seen.lock().unwrap().len(), 1);
            assert!(vad.state().is_speaking);
        }
    }

    mod calibration {
        use super::*;

        #[test]
        fn noisy_room_raises_threshold() {
            let mut vad = RmsVad::new(VadConfig {
                calibration_ms: 500,
                ..no_calibration()
            })
            .unwrap();
            vad.start().unwrap();
            assert!(vad.state().is_calibrating);

            let events = feed(&mut vad, 0, 600, 0.1);

            assert!(matches!(events[0], VadEvent::CalibrationComplete { .. }));
            let state = vad.state();
            assert!(!state.is_calibrating);
            assert!((state.noise_floor - 0.1).abs() < 1e-3);
            assert!((state.adaptive_threshold - 0.25).abs() < 1e-3);
        }

        #[test]
        fn background_noise_after_calibration_is_not_speech() {
            let mut vad = RmsVad::new(VadConfig {
                calibration_ms: 500,
                ..no_calibration()
            })
            .unwrap();
            vad.start().unwrap();
            feed(&mut vad, 0, 600, 0.1);
            assert!(feed(&mut vad, 600, 2000, 0.1).is_empty());
        }

        #[test]
        fn recalibrate_restarts_measurement() {
            let mut vad = RmsVad::new(VadConfig {
                calibration_ms: 200,
                ..no_calibration()
            })
            .unwrap();
            vad.start().unwrap();
            feed(&mut vad, 0, 300, 0.01);
            assert!(!vad.state().is_calibrating);
            vad.recalibrate();
            assert!(vad.state().is_calibrating);
        }
    }

    #[test]
    fn invalid_config_fails_construction() {
        let result = RmsVad::new(VadConfig {
            volume_threshold: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(VadError::Construction(_))));
    }
}
