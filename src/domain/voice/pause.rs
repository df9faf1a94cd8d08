//! Pause classification.
//!
//! A pure function from silence duration and context to a pause type, the
//! action it implies and a confidence score. For a fixed context the pause
//! type never decreases as the silence grows.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::foundation::ValidationError;

/// Ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseType {
    None,
    Breath,
    Thought,
    SentenceEnd,
    LongSilence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseAction {
    Continue,
    Wait,
    Process,
    EndSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PauseClassification {
    pub pause_type: PauseType,
    pub action: PauseAction,
    /// In [0.5, 1.0] for an unadjusted band, lower after contextual adjustment.
    pub confidence: f32,
}

impl PauseClassification {
    pub fn is_confident(&self, floor: f32) -> bool {
        self.confidence >= floor
    }
}

/// Upper band edges in milliseconds. Durations above `sentence_end_max_ms`
/// are long silences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseThresholds {
    /// Below this the gap is not a pause at all.
    pub min_pause_ms: u64,
    pub breath_max_ms: u64,
    pub thought_max_ms: u64,
    pub sentence_end_max_ms: u64,
}

impl Default for PauseThresholds {
    fn default() -> Self {
        Self {
            min_pause_ms: 150,
            breath_max_ms: 500,
            thought_max_ms: 1200,
            sentence_end_max_ms: 2500,
        }
    }
}

impl PauseThresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let edges = [
            self.min_pause_ms,
            self.breath_max_ms,
            self.thought_max_ms,
            self.sentence_end_max_ms,
        ];
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::invalid_format(
                "pause_thresholds",
                "band edges must be strictly increasing",
            ));
        }
        Ok(())
    }
}

/// What the classifier knows about the surrounding speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PauseContext {
    pub speech_just_started: bool,
    pub total_speech_ms: u64,
    /// The robot's last turn asked a question.
    pub question_pending: bool,
    /// Visitor's historical average pause, if known.
    pub average_pause_ms: Option<u64>,
}

const SHORT_SPEECH_MS: u64 = 1000;
const ADJUSTED_CONFIDENCE_FACTOR: f32 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct PauseClassifier {
    thresholds: PauseThresholds,
}

impl PauseClassifier {
    pub fn new(thresholds: PauseThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PauseThresholds {
        &self.thresholds
    }

    pub fn classify(&self, duration_ms: u64, context: &PauseContext) -> PauseClassification {
        let (base, confidence) = self.band(duration_ms);
        let adjusted = self.adjust(base, duration_ms, context);

        let confidence = if adjusted == base {
            confidence
        } else {
            confidence * ADJUSTED_CONFIDENCE_FACTOR
        };

        PauseClassification {
            pause_type: adjusted,
            action: Self::action_for(adjusted, context),
            confidence,
        }
    }

    fn band(&self, d: u64) -> (PauseType, f32) {
        let t = &self.thresholds;
        if d < t.min_pause_ms {
            let conf = 0.5 + 0.5 * (t.min_pause_ms - d) as f32 / t.min_pause_ms as f32;
            return (PauseType::None, conf);
        }
        let (pause_type, lo, hi) = if d <= t.breath_max_ms {
            (PauseType::Breath, t.min_pause_ms, t.breath_max_ms)
        } else if d <= t.thought_max_ms {
            (PauseType::Thought, t.breath_max_ms, t.thought_max_ms)
        } else if d <= t.sentence_end_max_ms {
            (PauseType::SentenceEnd, t.thought_max_ms, t.sentence_end_max_ms)
        } else {
            let beyond = (d - t.sentence_end_max_ms) as f32 / t.sentence_end_max_ms as f32;
            return (PauseType::LongSilence, 0.5 + 0.5 * beyond.min(1.0));
        };
        let half = (hi - lo) as f32 / 2.0;
        let edge_distance = (d - lo).min(hi - d) as f32;
        (pause_type, 0.5 + 0.5 * (edge_distance / half).min(1.0))
    }

    // Each rule maps the base type through a non-decreasing function, which
    // keeps the classification monotonic in duration.
    fn adjust(&self, base: PauseType, duration_ms: u64, context: &PauseContext) -> PauseType {
        let mut pause_type = base;

        if context.speech_just_started && pause_type == PauseType::Thought {
            pause_type = PauseType::Breath;
        }

        if pause_type == PauseType::SentenceEnd
            && (context.total_speech_ms < SHORT_SPEECH_MS || context.question_pending)
        {
            pause_type = PauseType::Thought;
        }

        // A pause no longer than the visitor's usual pause is part of their rhythm.
        if let Some(average) = context.average_pause_ms {
            if duration_ms <= average && pause_type == PauseType::Thought {
                pause_type = PauseType::Breath;
            }
        }

        pause_type
    }

    fn action_for(pause_type: PauseType, context: &PauseContext) -> PauseAction {
        match pause_type {
            PauseType::None | PauseType::Breath => PauseAction::Continue,
            PauseType::Thought => PauseAction::Wait,
            PauseType::SentenceEnd => PauseAction::Process,
            PauseType::LongSilence if context.total_speech_ms == 0 => PauseAction::EndSession,
            PauseType::LongSilence => PauseAction::Process,
        }
    }
}

/// Rolling record of the visitor's pauses.
#[derive(Debug, Clone)]
pub struct PauseHistory {
    pauses: VecDeque<u64>,
    capacity: usize,
}

impl PauseHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            pauses: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, pause_ms: u64) {
        if self.pauses.len() == self.capacity {
            self.pauses.pop_front();
        }
        self.pauses.push_back(pause_ms);
    }

    pub fn average(&self) -> Option<u64> {
        if self.pauses.is_empty() {
            return None;
        }
        Some(self.pauses.iter().sum::<u64>() / self.pauses.len() as u64)
    }

    pub fn len(&self) -> usize {
        self.pauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pauses.is_empty()
    }

    pub fn clear(&mut self) {
        self.pauses.clear();
    }
}

impl Default for PauseHistory {
    fn default() -> Self {
        Self::new(20)
    }
}
