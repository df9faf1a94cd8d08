//! Voice activity detection engines.
//!
//! - `RmsVad` - energy threshold with ambient noise calibration
//! - `MlVad` - `earshot` model (feature `ml-vad`)
//! - `create_vad_engine` - explicit or `auto` selection with fallback
//! - `SharedVad` - runtime handle implementing `VoiceActivityControl`

mod factory;
#[cfg(feature = "ml-vad")]
mod ml;
mod rms;
mod segmenter;

pub use factory::{create_vad_engine, SharedVad, VadSelection};
#[cfg(feature = "ml-vad")]
pub use ml::MlVad;
pub use rms::RmsVad;
