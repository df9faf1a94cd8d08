//! VAD engine selection and the shared handle used at runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

use super::rms::RmsVad;
use crate::domain::voice::{VadConfig, VadEngineKind, VadEvent, VadProfile, VadState};
use crate::ports::{VadEngine, VadError, VadListener, VoiceActivityControl};

/// A started engine plus how it was chosen.
pub struct VadSelection {
    pub engine: Box<dyn VadEngine>,
    /// The engine actually running (never `Auto`).
    pub kind: VadEngineKind,
    /// `auto` was requested and ML failed.
    pub used_fallback: bool,
}

impl std::fmt::Debug for VadSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VadSelection")
            .field("engine", &self.engine.name())
            .field("kind", &self.kind)
            .field("used_fallback", &self.used_fallback)
            .finish()
    }
}

/// Builds and starts an engine.
///
/// Explicit requests are honoured as-is and fail if unsupported. `Auto`
/// tries ML first and falls back to RMS on any construction or start
/// failure.
pub fn create_vad_engine(kind: VadEngineKind, config: VadConfig) -> Result<VadSelection, VadError> {
    match kind {
        VadEngineKind::Rms => Ok(VadSelection {
            engine: start_rms(config)?,
            kind: VadEngineKind::Rms,
            used_fallback: false,
        }),
        VadEngineKind::Ml => Ok(VadSelection {
            engine: start_ml(config)?,
            kind: VadEngineKind::Ml,
            used_fallback: false,
        }),
        VadEngineKind::Auto => match start_ml(config.clone()) {
            Ok(engine) => Ok(VadSelection {
                engine,
                kind: VadEngineKind::Ml,
                used_fallback: false,
            }),
            Err(err) => {
                warn!(error = %err, "ML VAD unavailable, falling back to RMS");
                Ok(VadSelection {
                    engine: start_rms(config)?,
                    kind: VadEngineKind::Rms,
                    used_fallback: true,
                })
            }
        },
    }
}

fn start_rms(config: VadConfig) -> Result<Box<dyn VadEngine>, VadError> {
    let mut engine = RmsVad::new(config)?;
    engine.start()?;
    Ok(Box::new(engine))
}

#[cfg(feature = "ml-vad")]
fn start_ml(config: VadConfig) -> Result<Box<dyn VadEngine>, VadError> {
    let mut engine = super::ml::MlVad::new(config)?;
    engine.start()?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "ml-vad"))]
fn start_ml(_config: VadConfig) -> Result<Box<dyn VadEngine>, VadError> {
    Err(VadError::unsupported("ml", "built without the ml-vad feature"))
}

/// Thread-safe handle over the live engine.
///
/// The audio thread feeds frames; the orchestrator switches profiles and
/// pauses detection through [`VoiceActivityControl`].
#[derive(Clone)]
pub struct SharedVad {
    engine: Arc<Mutex<Box<dyn VadEngine>>>,
    base: VadConfig,
    paused: Arc<AtomicBool>,
    used_fallback: bool,
}

impl SharedVad {
    pub fn new(selection: VadSelection) -> Self {
        let base = selection.engine.config().clone();
        info!(
            engine = selection.engine.name(),
            used_fallback = selection.used_fallback,
            "VAD engine ready"
        );
        Self {
            engine: Arc::new(Mutex::new(selection.engine)),
            base,
            paused: Arc::new(AtomicBool::new(false)),
            used_fallback: selection.used_fallback,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn VadEngine>> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Analyses a frame. Paused detectors drop frames.
    pub fn process_frame(&self, samples: &[f32], at: Duration) -> Vec<VadEvent> {
        if self.paused.load(Ordering::SeqCst) {
            return Vec::new();
        }
        self.lock().process_frame(samples, at)
    }

    pub fn on_event(&self, listener: VadListener) {
        self.lock().on_event(listener);
    }

    pub fn state(&self) -> VadState {
        self.lock().state()
    }

    pub fn recalibrate(&self) {
        self.lock().recalibrate();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn engine_name(&self) -> &'static str {
        self.lock().name()
    }
}

impl VoiceActivityControl for SharedVad {
    fn apply_profile(&self, profile: VadProfile) {
        self.lock().update_config(self.base.with_profile(profile));
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_config() -> VadConfig {
        VadConfig {
            calibration_ms: 0,
            ..Default::default()
        }
    }

    mod selection {
        use super::*;

        #[test]
        fn explicit_rms_is_honoured() {
            let selection = create_vad_engine(VadEngineKind::Rms, rms_config()).unwrap();
            assert_eq!(selection.kind, VadEngineKind::Rms);
            assert!(!selection.used_fallback);
            assert!(selection.engine.state().is_listening);
        }

        #[test]
        fn explicit_ml_fails_on_unsupported_rate() {
            let config = VadConfig {
                sample_rate: 48_000,
                ..rms_config()
            };
            let result = create_vad_engine(VadEngineKind::Ml, config);
            assert!(matches!(result, Err(VadError::Unsupported { .. })));
        }

        #[test]
        fn auto_falls_back_to_rms() {
            let config = VadConfig {
                sample_rate: 48_000,
                ..rms_config()
            };
            let selection = create_vad_engine(VadEngineKind::Auto, config).unwrap();
            assert_eq!(selection.kind, VadEngineKind::Rms);
            assert!(selection.used_fallback);
            assert_eq!(selection.engine.name(), "rms");
        }

        #[cfg(feature = "ml-vad")]
        #[test]
        fn auto_prefers_ml_when_supported() {
            let selection = create_vad_engine(VadEngineKind::Auto, rms_config()).unwrap();
            assert_eq!(selection.kind, VadEngineKind::Ml);
            assert!(!selection.used_fallback);
        }
    }

    mod control {
        use super::*;

        fn shared() -> SharedVad {
            SharedVad::new(create_vad_engine(VadEngineKind::Rms, rms_config()).unwrap())
        }

        #[test]
        fn barge_in_profile_raises_threshold() {
            let vad = shared();
            let before = vad.state().adaptive_threshold;
            vad.apply_profile(VadProfile::BargeIn);
            assert!(vad.state().adaptive_threshold > before);
            vad.apply_profile(VadProfile::Standard);
            assert_eq!(vad.state().adaptive_threshold, before);
        }

        #[test]
        fn paused_detector_drops_frames() {
            let vad = shared();
            vad.pause();
            assert!(vad.process_frame(&[0.5; 800], Duration::ZERO).is_empty());
            vad.resume();
            assert!(!vad.process_frame(&[0.5; 800], Duration::ZERO).is_empty());
        }
    }
}
