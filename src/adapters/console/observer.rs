//! Prints the conversation to stdout.

use tracing::debug;

use crate::domain::language::Language;
use crate::domain::voice::{InteractionError, InteractionState};
use crate::ports::InteractionObserver;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    verbose_errors: bool,
}

impl ConsoleObserver {
    pub fn new(verbose_errors: bool) -> Self {
        Self { verbose_errors }
    }

    /// Error line as printed: the message, or the full variant when verbose.
    pub fn render_error(&self, error: &InteractionError) -> String {
        if self.verbose_errors {
            format!("error: {} ({:?})", error, error)
        } else {
            format!("error: {}", error)
        }
    }
}

impl InteractionObserver for ConsoleObserver {
    fn on_state_changed(&self, from: InteractionState, to: InteractionState) {
        debug!(%from, %to, "Interaction state changed");
    }

    fn on_transcript(&self, text: &str, language: Language) {
        println!("you [{}]: {}", language, text);
    }

    fn on_response(&self, text: &str, language: Language) {
        println!("robi [{}]: {}", language, text);
    }

    fn on_error(&self, error: &InteractionError) {
        eprintln!("{}", self.render_error(error));
    }
}
