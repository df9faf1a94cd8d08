//! Speech recognizer adapters.

mod fallback;
mod text;

pub use fallback::FallbackRecognizer;
pub use text::{TextPayloadRecognizer, TEXT_MIME};
