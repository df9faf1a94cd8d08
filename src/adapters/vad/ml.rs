//! Model based VAD backed by `earshot`.
//!
//! Only 16 kHz input is supported; construction fails otherwise, which is
//! what drives the factory's `auto` fallback to RMS.

use earshot::{VoiceActivityDetector, VoiceActivityProfile};
use std::time::Duration;
use tracing::{debug, warn};

use super::rms::RmsVad;
use super::segmenter::SpeechSegmenter;
use crate::domain::voice::{VadConfig, VadEvent, VadState};
use crate::ports::{VadEngine, VadError, VadListener};

const SUPPORTED_RATE: u32 = 16_000;
/// 30 ms at 16 kHz.
const FRAME_SAMPLES: usize = 480;

pub struct MlVad {
    detector: VoiceActivityDetector,
    config: VadConfig,
    listeners: Vec<VadListener>,
    segmenter: SpeechSegmenter,
    scratch: Vec<i16>,
    is_listening: bool,
    current_volume: f32,
}

impl MlVad {
    pub fn new(config: VadConfig) -> Result<Self, VadError> {
        if config.sample_rate != SUPPORTED_RATE {
            return Err(VadError::unsupported(
                "ml",
                format!("requires {} Hz input, got {}", SUPPORTED_RATE, config.sample_rate),
            ));
        }
        config
            .validate()
            .map_err(|e| VadError::Construction(e.to_string()))?;

        Ok(Self {
            detector: VoiceActivityDetector::new(Self::profile_for(config.volume_threshold)),
            config,
            listeners: Vec::new(),
            segmenter: SpeechSegmenter::default(),
            scratch: Vec::with_capacity(FRAME_SAMPLES),
            is_listening: false,
            current_volume: 0.0,
        })
    }

    /// Higher energy thresholds map to more aggressive model profiles.
    fn profile_for(threshold: f32) -> VoiceActivityProfile {
        match threshold {
            t if t >= 0.05 => VoiceActivityProfile::VERY_AGGRESSIVE,
            t if t >= 0.03 => VoiceActivityProfile::AGGRESSIVE,
            t if t >= 0.015 => VoiceActivityProfile::LBR,
            _ => VoiceActivityProfile::QUALITY,
        }
    }

    /// A frame is voiced if any 30 ms window in it is.
    fn is_voiced(&mut self, samples: &[f32]) -> bool {
        let mut voiced = false;
        for chunk in samples.chunks(FRAME_SAMPLES) {
            self.scratch.clear();
            self.scratch
                .extend(chunk.iter().map(|s| (s.clamp(-1.0, 1.0) * 32_767.0) as i16));
            self.scratch.resize(FRAME_SAMPLES, 0);
            match self.detector.predict_16khz(&self.scratch) {
                Ok(true) => voiced = true,
                Ok(false) => {}
                Err(_) => warn!(samples = chunk.len(), "ML VAD prediction failed"),
            }
        }
        voiced
    }

    fn emit(&self, events: &[VadEvent]) {
        for event in events {
            for listener in &self.listeners {
                listener(event);
            }
        }
    }
}

impl VadEngine for MlVad {
    fn start(&mut self) -> Result<(), VadError> {
        self.detector.reset();
        self.segmenter.reset();
        self.is_listening = true;
        debug!("ML VAD started");
        Ok(())
    }

    fn stop(&mut self) {
        self.is_listening = false;
        self.segmenter.reset();
        self.current_volume = 0.0;
    }

    fn process_frame(&mut self, samples: &[f32], at: Duration) -> Vec<VadEvent> {
        if !self.is_listening {
            return Vec::new();
        }

        let level = RmsVad::frame_level(samples);
        self.current_volume = level;
        let voiced = self.is_voiced(samples);

        let mut events = vec![VadEvent::Volume { level }];
        events.extend(self.segmenter.observe(voiced, level, at, &self.config));
        self.emit(&events);
        events
    }

    fn set_threshold(&mut self, threshold: f32) {
        self.config.volume_threshold = threshold.clamp(0.0, 1.0);
        self.detector = VoiceActivityDetector::new(Self::profile_for(self.config.volume_threshold));
    }

    fn update_config(&mut self, config: VadConfig) {
        let threshold = config.volume_threshold;
        self.config = config;
        self.set_threshold(threshold);
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
            is_calibrating: false,
            adaptive_threshold: self.config.volume_threshold,
            noise_floor: 0.0,
        }
    }

    fn recalibrate(&mut self) {
        self.detector.reset();
        self.segmenter.reset();
    }

    fn on_event(&mut self, listener: VadListener) {
        self.listeners.push(listener);
    }

    fn name(&self) -> &'static str {
        "ml"
    }
}
