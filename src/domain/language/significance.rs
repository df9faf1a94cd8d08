//! Guard that separates real utterances from recognizer noise.

use once_cell::sync::Lazy;
use regex::Regex;

static ALPHABETIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Alphabetic}{2,}").unwrap());

/// Default minimum trimmed length for a transcript to count.
pub const DEFAULT_MIN_SIGNIFICANT_CHARS: usize = 3;

/// Returns true when a transcript carries enough text to act on.
///
/// Text shorter than `min_chars` (after trimming) or without at least one
/// run of two alphabetic characters is noise: its language label must not
/// influence the conversation and it must not reach the dialogue model.
pub fn is_significant(text: &str, min_chars: usize) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= min_chars && ALPHABETIC_RUN.is_match(trimmed)
}
