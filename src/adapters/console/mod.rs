//! Console adapters for running the loop from a terminal.
//!
//! Typed lines stand in for microphone audio and playback is simulated
//! with a timer, so the full interaction loop can be exercised without
//! audio hardware.

mod animation;
mod lead_sink;
mod observer;
mod player;
mod recorder;

pub use animation::ConsoleAnimation;
pub use lead_sink::LoggingLeadSink;
pub use observer::ConsoleObserver;
pub use player::ConsolePlayer;
pub use recorder::ConsoleRecorder;
