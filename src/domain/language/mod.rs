//! Language module - normalization and stability of the conversation language.
//!
//! # Components
//!
//! - `Language` - the supported set and label normalization
//! - `is_significant` - noise guard applied before a detection may count
//! - `LanguageHistory` - bounded ring buffer of per-turn detections
//! - `LanguageConfirmation` - debounced switching of the confirmed language

mod code;
mod confirmation;
mod detection;
mod significance;

pub use code::Language;
pub use confirmation::{
    ConfirmationSettings, LanguageConfirmation, LanguageDecision, DEFAULT_CONFIRMATION_THRESHOLD,
};
pub use detection::{LanguageDetection, LanguageHistory, DEFAULT_HISTORY_CAPACITY};
pub use significance::{is_significant, DEFAULT_MIN_SIGNIFICANT_CHARS};
